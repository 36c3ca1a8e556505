#![deny(
    rust_2018_idioms,
    unreachable_pub,
    unsafe_code,
    unused_imports,
    unused_mut,
    missing_debug_implementations
)]

use anyhow::Context;
use bytes::Bytes;
use colored::*;
use enum_iterator::IntoEnumIterator;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use itertools::Itertools;
use rayon::prelude::*;
use std::io::Write;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use wzreader::{
    IvPreset, WzDirectory, WzListProperty, WzPackage, WzProperty, WzValue,
};

#[derive(StructOpt, Debug)]
#[structopt()]
struct Opt {
    /// Archives to decode
    #[structopt(required = true, name = "ARCHIVES", parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Game version the archives were built for
    #[structopt(short = "g", long = "game-version")]
    version: u32,

    /// IV preset name (gms, sea, empty) or hex bytes
    #[structopt(long, default_value = "gms", parse(try_from_str = parse_iv))]
    iv: Iv,

    /// Print the decoded tree as JSON
    #[structopt(long)]
    json: bool,

    /// Write raw canvas and sound payloads to the output directory
    #[structopt(short, long)]
    extract: bool,

    /// Directory to output extracted payloads
    #[structopt(
        short = "o",
        long = "output",
        parse(from_os_str),
        default_value = "ext/"
    )]
    output_dir: PathBuf,
}

#[derive(Debug)]
struct Iv(Vec<u8>);

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    match run(&opt) {
        Ok(_) => (),
        Err(err) => log::error!("Error while decoding: {}", err),
    }
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    // archives are independent, each decode stays on one thread
    let packages = opt
        .files
        .par_iter()
        .filter(|file| file.is_file())
        .map(|file| (file, decode_archive(file, opt)))
        .collect::<Vec<(&PathBuf, anyhow::Result<WzPackage>)>>();

    packages.into_iter().try_for_each(|(file, package)| {
        let package = match package {
            Ok(package) => package,
            Err(err) => {
                log::error!("{:?}: {:#}", file, err);
                return Ok(());
            }
        };
        if opt.json {
            println!("{}", serde_json::to_string_pretty(&package)?);
        } else {
            println!("{}", format!("{:?}", file).bold());
            print_directory(&package.directory, 1);
        }
        if opt.extract {
            extract_payloads(file, &package, &opt.output_dir)?;
        }
        Ok(())
    })
}

fn decode_archive(file: &Path, opt: &Opt) -> anyhow::Result<WzPackage> {
    let data = std::fs::read(file)
        .with_context(|| format!("Could not read archive: {:?}", file))?;
    log::debug!("Decoding {:?} ({} bytes)", file, data.len());
    let package = wzreader::read_package(&data, &opt.iv.0, opt.version)
        .with_context(|| format!("Could not decode archive: {:?}", file))?;
    Ok(package)
}

fn parse_iv(s: &str) -> anyhow::Result<Iv> {
    if let Some(preset) = IvPreset::from_name(s) {
        return Ok(Iv(preset.iv().to_vec()));
    }
    let s = s.trim_start_matches("0x");
    if !s.is_ascii() || s.is_empty() || s.len() % 2 != 0 || s.len() > 32 {
        anyhow::bail!(
            "Expected one of [{}] or 1 to 16 hex bytes",
            IvPreset::into_enum_iter()
                .map(|p| p.get_name().to_string())
                .join(", ")
        );
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .with_context(|| format!("Invalid hex byte: {}", &s[i..i + 2]))
        })
        .collect::<anyhow::Result<Vec<u8>>>()
        .map(Iv)
}

fn print_directory(directory: &WzDirectory, indent: usize) {
    let pad = "  ".repeat(indent);
    for (name, child) in directory
        .directories
        .iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
    {
        println!("{}{}/", pad, name.blue().bold());
        print_directory(child, indent + 1);
    }
    for (name, image) in
        directory.images.iter().sorted_by(|a, b| a.0.cmp(b.0))
    {
        println!("{}{}", pad, name.green());
        print_list(&image.property, indent + 1);
    }
}

fn print_list(list: &WzListProperty, indent: usize) {
    let pad = "  ".repeat(indent);
    for (name, value) in list.iter() {
        match value {
            WzValue::Property(property) => {
                println!("{}{} [{}]", pad, name, property.get_name().yellow());
                print_property(property, indent + 1);
            }
            value => println!("{}{} = {}", pad, name, format_value(value)),
        }
    }
}

fn print_property(property: &WzProperty, indent: usize) {
    let pad = "  ".repeat(indent);
    match property {
        WzProperty::List(list) => print_list(list, indent),
        WzProperty::Canvas(canvas) => {
            println!(
                "{}{}x{} format {}/{} ({} bytes)",
                pad,
                canvas.width,
                canvas.height,
                canvas.format,
                canvas.format2,
                canvas.data.len()
            );
            print_list(&canvas.properties, indent);
        }
        WzProperty::Vector(vector) => {
            println!("{}({}, {})", pad, vector.x, vector.y)
        }
        WzProperty::Convex(convex) => {
            for (i, child) in convex.properties.iter().enumerate() {
                println!("{}{} [{}]", pad, i, child.get_name().yellow());
                print_property(child, indent + 1);
            }
        }
        WzProperty::Sound(sound) => println!(
            "{}{} ms ({} bytes)",
            pad,
            sound.duration,
            sound.data.len()
        ),
        WzProperty::Uol(uol) => println!("{}-> {}", pad, uol.uol.cyan()),
    }
}

fn format_value(value: &WzValue) -> String {
    match value {
        WzValue::Null => "null".to_string(),
        WzValue::Short(v) => v.to_string(),
        WzValue::Int(v) => v.to_string(),
        WzValue::Long(v) => v.to_string(),
        WzValue::Float(v) => v.to_string(),
        WzValue::Double(v) => v.to_string(),
        WzValue::String(v) => format!("{:?}", v),
        WzValue::Property(p) => p.get_name().to_string(),
    }
}

fn extract_payloads(
    file: &Path,
    package: &WzPackage,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let mut payloads = Vec::new();
    for (path, image) in package.directory.get_all_images() {
        collect_list(&path, &image.property, &mut payloads);
    }
    let archive_name = file.file_stem().context("Could not get file name")?;
    let progress_bar = init_progressbar(
        &format!("Extracting: {:?}", file),
        payloads.len() as u64,
    );

    payloads
        .par_iter()
        .progress_with(progress_bar)
        .try_for_each(|(path, data)| {
            let mut output_file_name = PathBuf::from(output_dir);
            output_file_name.push(archive_name);
            output_file_name.push(path);
            std::fs::create_dir_all(
                &output_file_name
                    .parent()
                    .context("Could not get parent directory")?,
            )?;
            log::debug!(
                "Extracting payload: {:?} ({} bytes)",
                output_file_name,
                data.len()
            );
            File::create(output_file_name)?.write_all(data)?;
            Ok(())
        })
}

fn collect_list<'a>(
    path: &str,
    list: &'a WzListProperty,
    payloads: &mut Vec<(String, &'a Bytes)>,
) {
    for (name, value) in list.iter() {
        if let WzValue::Property(property) = value {
            collect_property(&format!("{}/{}", path, name), property, payloads);
        }
    }
}

fn collect_property<'a>(
    path: &str,
    property: &'a WzProperty,
    payloads: &mut Vec<(String, &'a Bytes)>,
) {
    match property {
        WzProperty::List(list) => collect_list(path, list, payloads),
        WzProperty::Canvas(canvas) => {
            payloads.push((format!("{}.canvas", path), &canvas.data));
            collect_list(path, &canvas.properties, payloads);
        }
        WzProperty::Sound(sound) => {
            payloads.push((format!("{}.sound", path), &sound.data))
        }
        WzProperty::Convex(convex) => {
            for (i, child) in convex.properties.iter().enumerate() {
                collect_property(&format!("{}/{}", path, i), child, payloads);
            }
        }
        WzProperty::Vector(_) | WzProperty::Uol(_) => (),
    }
}

fn init_progressbar(prefix: &str, size: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(size).with_style(
        ProgressStyle::default_bar().template(
            " {spinner} {prefix} {wide_bar:} {pos:>6}/{len:6} ETA:[{eta}]",
        ),
    );
    progress_bar.set_prefix(prefix);
    progress_bar
}
