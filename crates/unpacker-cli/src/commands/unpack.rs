//! Unpack command: resolve the resource order and write the binaries.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result, bail};
use clap::Args;
use unpacker_core::{DEFAULT_TARGET, ResolveOptions, ResourceOrder, Unpacker};
use unpacker_movie::{DoAbc, Input, Movie};

use crate::config::Config;
use crate::stats::{Timings, format_size};

/// Movie unpacked when neither the flags nor the config name one
pub const DEFAULT_INPUT: &str = "https://www.transformice.com/Transformice.swf";

/// Target that writes to standard output
const STDOUT: &str = "-";

#[derive(Args, Debug)]
pub struct UnpackCommand {
    /// The file url to unpack. Can be a file from the filesystem or an url to download.
    /// `-` reads standard input
    #[arg(short, long)]
    pub input: Option<String>,

    /// Index of the packed class in frame1
    #[arg(long = "class", value_name = "INDEX")]
    pub class_index: Option<usize>,

    /// Call literal preceding each resource name
    #[arg(long)]
    pub target: Option<String>,

    /// Fail on a missing keymap or an unmapped accessor call
    #[arg(long)]
    pub strict: bool,

    /// Print the resolved order instead of writing the binaries
    #[arg(long)]
    pub order_only: bool,

    /// Print the order as a JSON array
    #[arg(long, requires = "order_only")]
    pub json: bool,

    /// The output file. `-` writes to standard output
    #[arg(required_unless_present = "order_only")]
    pub output: Option<String>,
}

impl UnpackCommand {
    /// Movie source: flag, then config, then the default URL
    pub fn input(&self, config: &Config) -> Input {
        let source = self
            .input
            .as_deref()
            .or(config.input.as_deref())
            .unwrap_or(DEFAULT_INPUT);
        match source.parse() {
            Ok(input) => input,
            Err(never) => match never {},
        }
    }

    /// Resolution options: flags override the config
    pub fn options(&self, config: &Config) -> ResolveOptions {
        ResolveOptions {
            class_index: self.class_index.or(config.class_index).unwrap_or(0),
            target: self
                .target
                .clone()
                .or_else(|| config.target.clone())
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            strict: self.strict || config.strict,
        }
    }

    pub fn run(&self, config: &Config) -> Result<()> {
        let mut timings = Timings::start();

        let input = self.input(config);
        if input.is_url() {
            tracing::info!("Downloading {input}");
        } else {
            tracing::info!("Reading {} {input}", input.kind());
        }
        let bytes = input
            .read_bytes()
            .with_context(|| format!("Failed to read {input}"))?;
        tracing::info!("File size: {}", format_size(bytes.len()));
        timings.mark("Reading file");

        let movie = Movie::from_buffer(&bytes).context("Invalid SWF")?;
        tracing::info!(
            version = movie.header.version,
            compression = %movie.header.compression,
            tags = movie.tag_count,
            "parsed movie"
        );
        timings.mark("Parsing file");

        let mut unpacker = Unpacker::new(&movie)?.with_options(self.options(config));
        log_frame1(unpacker.frame1());

        let order = unpacker.resolve_order()?;
        if order.is_empty() {
            bail!("Unable to resolve binaries order. Is it already unpacked?");
        }
        timings.mark("Resolving order");

        if self.order_only {
            print_order(unpacker.order(), self.json)?;
            timings.report();
            return Ok(());
        }

        unpacker.resolve_binaries();
        timings.mark("Resolving binaries");

        let output = self.output.as_deref().unwrap_or(STDOUT);
        let missing = if output == STDOUT {
            let mut stdout = io::stdout().lock();
            let missing = unpacker.write_binaries(&mut stdout)?;
            stdout.flush()?;
            missing
        } else {
            tracing::info!("Writing to file {output}");
            let file = File::create(output).with_context(|| format!("Failed to create {output}"))?;
            let mut writer = BufWriter::new(file);
            let missing = unpacker.write_binaries(&mut writer)?;
            // keep what was written before a missing name
            writer
                .flush()
                .with_context(|| format!("Failed to write {output}"))?;
            missing
        };
        if let Some(name) = missing {
            bail!("Unable to find binary with name: {name}");
        }
        timings.mark("Writing to file");

        timings.report();
        Ok(())
    }
}

fn log_frame1(frame1: &DoAbc) {
    let abc = &frame1.abc;
    tracing::info!(
        flags = frame1.flags,
        size = %format_size(frame1.size),
        classes = abc.class_count(),
        methods = abc.methods.len(),
        strings = abc.constants.strings.len(),
        "Found frame1"
    );
}

fn print_order(order: &ResourceOrder, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(order)?);
    } else {
        for name in order {
            println!("{name}");
        }
    }
    Ok(())
}
