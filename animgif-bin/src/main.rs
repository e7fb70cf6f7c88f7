// main.rs      animgif command
//
// Copyright (c) 2019-2025  Douglas Lau
//
#![forbid(unsafe_code)]

use animgif::block::DisposalMethod;
use animgif::{ColorTableMode, Decoder, FrameMetadata, ImageInfo};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rgb::RGBA8;
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("check", Some(matches)) => check(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Arguments shared by all subcommands
fn common_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("files")
            .required(true)
            .min_values(1)
            .help("input file(s)"),
        Arg::with_name("max-frames")
            .long("max-frames")
            .value_name("N")
            .takes_value(true)
            .help("maximum number of frames to decode"),
        Arg::with_name("skip-metadata")
            .long("skip-metadata")
            .help("skip comments and XMP data"),
    ]
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("animgif")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("Animated GIF utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .args(&common_args()),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Decode and composite every frame")
                .args(&common_args()),
        )
}

/// Create a decoder for one file
fn decoder(
    matches: &ArgMatches,
    path: &OsStr,
) -> Result<Decoder<BufReader<File>>, Box<dyn Error>> {
    let max_frames = matches
        .value_of("max-frames")
        .map(str::parse::<usize>)
        .transpose()?;
    let f = BufReader::new(File::open(path)?);
    Ok(Decoder::new(f)
        .max_frames(max_frames)
        .skip_metadata(matches.is_present("skip-metadata")))
}

/// Color specs for output
struct Colors {
    dflt: ColorSpec,
    bold: ColorSpec,
    red: ColorSpec,
    magenta: ColorSpec,
    yellow: ColorSpec,
    cyan: ColorSpec,
}

impl Colors {
    fn new() -> Self {
        let mut dflt = ColorSpec::new();
        dflt.set_fg(Some(Color::White));
        let mut bold = ColorSpec::new();
        bold.set_fg(Some(Color::White))
            .set_intense(true)
            .set_bold(true);
        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_intense(true);
        let mut magenta = ColorSpec::new();
        magenta.set_fg(Some(Color::Magenta));
        let mut yellow = ColorSpec::new();
        yellow.set_fg(Some(Color::Yellow)).set_intense(true);
        let mut cyan = ColorSpec::new();
        cyan.set_fg(Some(Color::Cyan)).set_intense(true);
        Colors {
            dflt,
            bold,
            red,
            magenta,
            yellow,
            cyan,
        }
    }
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let colors = Colors::new();
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            out.set_color(&colors.magenta)?;
            writeln!(out, "{path:?}")?;
            match decoder(matches, path)?.identify() {
                Ok(info) => show_info(out, &colors, &info)?,
                Err(e) => {
                    out.set_color(&colors.red)?;
                    writeln!(out, "error: {e}")?;
                }
            }
        }
    }
    Ok(())
}

/// Column layout of a frame table
struct Columns {
    width: u16,
    height: u16,
    global_clr: usize,
    frame_digits: usize,
    size_digits: usize,
}

/// Show metadata of one GIF file
fn show_info(
    out: &mut StandardStream,
    colors: &Colors,
    info: &ImageInfo,
) -> Result<(), Box<dyn Error>> {
    let meta = &info.metadata;
    let cols = Columns {
        width: info.width,
        height: info.height,
        global_clr: meta.global_color_table_len,
        frame_digits: digits(info.frames.len()).max(3),
        size_digits: 4.max(1 + digits(info.width) + digits(info.height)),
    };
    let mut comments = vec![];
    for cmt in &meta.comments {
        for l in cmt.split('\n') {
            let l = l.trim();
            if !l.is_empty() {
                comments.push(l.to_string());
            }
        }
    }
    out.set_color(&colors.bold)?;
    write!(
        out,
        "{}x{}, frames: {}, repeat: ",
        info.width,
        info.height,
        info.frames.len()
    )?;
    match meta.repeat_count {
        0 => write!(out, "∞")?,
        c => write!(out, "{c}")?,
    }
    if meta.xmp.is_some() {
        write!(out, ", xmp")?;
    }
    writeln!(out)?;
    out.set_color(&colors.cyan)?;
    for c in comments {
        writeln!(out, "  # {c}")?;
    }
    out.set_color(&colors.yellow)?;
    write!(out, " {:>w$}", "Fr#", w = cols.frame_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = cols.size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = cols.size_digits)?;
    writeln!(out, " Clrs Trn")?;
    for (n, frame) in info.frames.iter().enumerate() {
        show_frame(out, colors, &cols, n, frame)?;
    }
    Ok(())
}

/// Show one frame of a GIF file
fn show_frame(
    out: &mut StandardStream,
    colors: &Colors,
    cols: &Columns,
    number: usize,
    frame: &FrameMetadata,
) -> Result<(), Box<dyn Error>> {
    out.set_color(&colors.dflt)?;
    let interlaced = if frame.interlaced { 'i' } else { ' ' };
    write!(out, "{interlaced}")?;
    out.set_color(&colors.bold)?;
    write!(out, "{:>w$}", number, w = cols.frame_digits)?;
    let d = frame.delay_time_cs;
    if d == 0 {
        out.set_color(&colors.dflt)?;
    }
    write!(out, " {:6.2}", f32::from(d) / 100.0)?;
    let disp = match frame.disposal_method {
        DisposalMethod::NoAction => "none",
        DisposalMethod::Keep => "keep",
        DisposalMethod::Background => "bg",
        DisposalMethod::Previous => "prev",
        DisposalMethod::Reserved(_) => "res",
    };
    out.set_color(match disp {
        "none" => &colors.dflt,
        "res" => &colors.red,
        _ => &colors.bold,
    })?;
    write!(out, " {disp:>4}")?;
    let region = frame.region;
    if usize::from(cols.width) == region.width
        && usize::from(cols.height) == region.height
    {
        out.set_color(&colors.dflt)?;
    } else {
        out.set_color(&colors.bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", region.width, region.height),
        w = cols.size_digits
    )?;
    if region.x == 0 && region.y == 0 {
        out.set_color(&colors.dflt)?;
    } else {
        out.set_color(&colors.bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", region.x, region.y),
        w = cols.size_digits
    )?;
    match frame.color_table_mode {
        ColorTableMode::Local => {
            out.set_color(&colors.bold)?;
            write!(out, "  {:3}", frame.color_table_len)?;
        }
        ColorTableMode::Global => {
            out.set_color(&colors.dflt)?;
            write!(out, " {:3}g", cols.global_clr)?;
        }
    }
    match frame.transparent_color {
        Some(tc) => {
            out.set_color(&colors.bold)?;
            writeln!(out, " {tc:>3}")?;
        }
        None => {
            out.set_color(&colors.dflt)?;
            writeln!(out, " {:>3}", "-")?;
        }
    }
    Ok(())
}

/// Handle check subcommand
fn check(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let colors = Colors::new();
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            out.set_color(&colors.magenta)?;
            writeln!(out, "{path:?}")?;
            for (n, step) in decoder(matches, path)?
                .into_steps::<RGBA8>()
                .enumerate()
            {
                match step {
                    Ok(step) => {
                        let opaque = step
                            .raster()
                            .pixels()
                            .filter(|p| p.a > 0)
                            .count();
                        out.set_color(&colors.dflt)?;
                        writeln!(
                            out,
                            "{n:>4} {:6.2} opaque: {opaque}",
                            f32::from(step.delay_time_cs()) / 100.0
                        )?;
                    }
                    Err(e) => {
                        out.set_color(&colors.red)?;
                        writeln!(out, "error: {e}")?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
