use anyhow::Result;
use clap::Parser;

use ffmpeg_decode::available_hw_devices;
use ffmpeg_types::HwDeviceType;

use super::Context;

#[derive(Parser, Debug)]
pub struct DevicesCommand;

impl DevicesCommand {
    pub fn run(self, _context: &Context) -> Result<()> {
        let devices = available_hw_devices();
        if devices.is_empty() {
            println!("Your system have no hardware decoders.");
            return Ok(());
        }

        let preferred = HwDeviceType::preferred(&devices);
        println!("Hardware device types:");
        for (index, device) in devices.iter().enumerate() {
            let surface = device
                .pixel_format()
                .map_or_else(|| "-".to_string(), |format| format.to_string());
            let marker = if Some(*device) == preferred { " (default)" } else { "" };
            println!("  {:>2}. {:<14} {}{}", index + 1, device.name(), surface, marker);
        }
        Ok(())
    }
}
