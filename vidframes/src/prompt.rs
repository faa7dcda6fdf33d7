use std::io::{self, BufRead, Write};

use ffmpeg_types::HwDeviceType;

/**
    Ask whether to decode on a hardware device, and which one.

    Answering anything but `y` keeps software decoding. The preferred device
    is pre-selected; an empty or non-numeric answer keeps it, a number that
    matches no listed device falls back to software.
*/
pub fn select_hw_device(
    input: &mut impl BufRead,
    output: &mut impl Write,
    available: &[HwDeviceType],
) -> io::Result<Option<HwDeviceType>> {
    writeln!(output, "Use hardware acceleration for decoding?[n]")?;
    if read_answer(input)? != "y" {
        return Ok(None);
    }

    writeln!(output, "Select hardware decoder:")?;
    for (index, device) in available.iter().enumerate() {
        writeln!(output, "{}. {}", index + 1, device)?;
    }

    let Some(preselected) = HwDeviceType::preferred(available) else {
        writeln!(output, "Your system have no hardware decoders.")?;
        return Ok(None);
    };
    let preselected_number = available
        .iter()
        .position(|device| *device == preselected)
        .map_or(1, |index| index + 1);
    writeln!(output, "Selected [{preselected_number}]")?;
    output.flush()?;

    let number = match read_answer(input)?.parse::<usize>() {
        Ok(0) | Err(_) => preselected_number,
        Ok(number) => number,
    };
    Ok(number
        .checked_sub(1)
        .and_then(|index| available.get(index))
        .copied())
}

fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str, available: &[HwDeviceType]) -> (Option<HwDeviceType>, String) {
        let mut output = Vec::new();
        let selected =
            select_hw_device(&mut Cursor::new(answers), &mut output, available).unwrap();
        (selected, String::from_utf8(output).unwrap())
    }

    const DEVICES: &[HwDeviceType] = &[HwDeviceType::Vdpau, HwDeviceType::Cuda];

    #[test]
    fn declining_keeps_software() {
        let (selected, output) = run("n\n", DEVICES);
        assert_eq!(selected, None);
        assert_eq!(output, "Use hardware acceleration for decoding?[n]\n");

        assert_eq!(run("", DEVICES).0, None);
    }

    #[test]
    fn lists_devices_and_takes_a_number() {
        let (selected, output) = run("y\n2\n", DEVICES);
        assert_eq!(selected, Some(HwDeviceType::Cuda));
        assert!(output.contains("Select hardware decoder:\n1. vdpau\n2. cuda\n"));
        assert!(output.ends_with("Selected [1]\n"));
    }

    #[test]
    fn empty_or_invalid_answer_keeps_preselection() {
        assert_eq!(run("y\n\n", DEVICES).0, Some(HwDeviceType::Vdpau));
        assert_eq!(run("y\nabc\n", DEVICES).0, Some(HwDeviceType::Vdpau));
        assert_eq!(run("y\n0\n", DEVICES).0, Some(HwDeviceType::Vdpau));
    }

    #[test]
    fn unknown_number_falls_back_to_software() {
        assert_eq!(run("y\n9\n", DEVICES).0, None);
    }

    #[test]
    fn dxva2_is_preselected() {
        let devices = [HwDeviceType::Cuda, HwDeviceType::Dxva2];
        let (selected, output) = run("y\n\n", &devices);
        assert_eq!(selected, Some(HwDeviceType::Dxva2));
        assert!(output.contains("Selected [2]"));
    }

    #[test]
    fn no_devices() {
        let (selected, output) = run("y\n", &[]);
        assert_eq!(selected, None);
        assert!(output.ends_with("Your system have no hardware decoders.\n"));
    }
}
