use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;

use ffmpeg_native::LibraryLoader;
use ffmpeg_native::loader::load_order;

use super::Context;

#[derive(Parser, Debug)]
pub struct LibrariesCommand {
    /// Directory to search (defaults to --ffmpeg-dir)
    pub dir: Option<PathBuf>,

    /// Only accept this major version of a library, as NAME=MAJOR
    #[arg(long = "pin", value_parser = parse_pin)]
    pub pins: Vec<(String, u32)>,

    /// How deep to search below the directory
    #[arg(long)]
    pub max_depth: Option<usize>,
}

fn parse_pin(value: &str) -> Result<(String, u32), String> {
    let (name, major) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MAJOR, got '{value}'"))?;
    let major = major
        .trim()
        .parse()
        .map_err(|_| format!("invalid major version in '{value}'"))?;
    Ok((name.trim().to_string(), major))
}

impl LibrariesCommand {
    pub fn run(self, context: &Context) -> Result<()> {
        let dir = self
            .dir
            .or_else(|| context.ffmpeg_dir.clone())
            .context("no library directory given, pass one or set FFMPEG_DIR")?;

        let mut loader = LibraryLoader::new(&dir);
        for (name, major) in &self.pins {
            loader = loader.with_version(name, *major);
        }
        if let Some(depth) = self.max_depth {
            loader = loader.with_max_depth(depth);
        }

        let resolved = loader.resolve_all()?;
        let mut names: Vec<&str> = resolved.keys().copied().collect();
        names.sort_unstable();

        println!("Libraries under {}:", dir.display());
        for name in &names {
            let file = &resolved[*name];
            let major = file
                .major
                .map_or_else(|| "?".to_string(), |major| major.to_string());
            println!("  {name:<12} {major:>3}  {}", file.path.display());
        }

        loader.load_all(&load_order(&names)?)?;

        println!("Load order:");
        for name in loader.loaded() {
            let Some(library) = loader.get(name) else {
                continue;
            };
            match library.version() {
                Ok(version) => println!("  {name:<12} {version}"),
                Err(e) => println!("  {name:<12} version unavailable ({e})"),
            }
        }

        match loader.version_info() {
            Ok(info) => println!("FFmpeg version info: {info}"),
            Err(e) => tracing::warn!(error = %e, "could not query version info"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pins() {
        assert_eq!(parse_pin("avcodec=61"), Ok(("avcodec".to_string(), 61)));
        assert_eq!(parse_pin(" avutil = 59 "), Ok(("avutil".to_string(), 59)));
        assert!(parse_pin("avcodec").is_err());
        assert!(parse_pin("avcodec=new").is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let context = Context {
            output_dir: PathBuf::from("."),
            ffmpeg_dir: None,
        };
        let command = LibrariesCommand {
            dir: None,
            pins: Vec::new(),
            max_depth: None,
        };
        assert!(command.run(&context).is_err());
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let context = Context {
            output_dir: PathBuf::from("."),
            ffmpeg_dir: Some(dir.path().to_path_buf()),
        };
        let command = LibrariesCommand {
            dir: None,
            pins: Vec::new(),
            max_depth: Some(1),
        };
        command.run(&context).unwrap();
    }
}
