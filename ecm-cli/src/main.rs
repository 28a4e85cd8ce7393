use anyhow::{Context, Result};
use clap::Parser;
use ecm::RunTally;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

/// Encode or decode ECM (Error Code Modeler) CD-ROM sector containers.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input file (standard input if omitted)
    inputfile: Option<PathBuf>,

    /// Force decode mode (also implied when invoked as `unecm`)
    #[clap(short, long)]
    decode: bool,

    /// Output file (standard output if omitted)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Show a progress indicator and a summary report on standard error
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = Args::parse();

    if invoked_as_unecm() {
        args.decode = true;
    }

    let (input, input_len): (Box<dyn Read>, Option<u64>) = match &args.inputfile {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let len = file.metadata().ok().map(|m| m.len());
            (Box::new(BufReader::new(file)), len)
        }
        None => (Box::new(BufReader::new(io::stdin())), None),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    if args.decode {
        run_decode(input, input_len, output, args.verbose)
    } else {
        run_encode(input, input_len, output, args.verbose)
    }
}

fn invoked_as_unecm() -> bool {
    std::env::args()
        .next()
        .map(|argv0| {
            let name = PathBuf::from(argv0);
            name.file_stem().and_then(|s| s.to_str()).map(|s| s == "unecm").unwrap_or(false)
        })
        .unwrap_or(false)
}

fn run_encode(input: Box<dyn Read>, input_len: Option<u64>, mut output: Box<dyn Write>, verbose: bool) -> Result<()> {
    let bar = verbose.then(|| progress_bar(input_len));
    let mut encoder = ecm::Encoder::with_total_bytes(input_len.unwrap_or(0));

    let tally = {
        let mut cb = bar.as_ref().map(|bar| progress_callback(bar));
        encoder
            .encode(input, &mut output, cb.as_deref_mut())
            .context("encoding input")?
    };
    output.flush().context("flushing output")?;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    if verbose {
        report_tally(&tally);
    }
    Ok(())
}

fn run_decode(input: Box<dyn Read>, input_len: Option<u64>, mut output: Box<dyn Write>, verbose: bool) -> Result<()> {
    let bar = verbose.then(|| progress_bar(input_len));
    let mut decoder = ecm::Decoder::with_total_bytes(input_len.unwrap_or(0));

    {
        let mut cb = bar.as_ref().map(|bar| progress_callback(bar));
        decoder.decode(input, &mut output, cb.as_deref_mut()).context("decoding input")?;
    }
    output.flush().context("flushing output")?;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    Ok(())
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    let bar = match total {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
    {
        bar.set_style(style);
    }
    bar
}

fn progress_callback(bar: &ProgressBar) -> Box<dyn FnMut(u64, u64) + '_> {
    Box::new(move |consumed, _total| bar.set_position(consumed))
}

fn report_tally(tally: &RunTally) {
    eprintln!("Literal bytes........... {:>10}", tally.literal);
    eprintln!("Mode 1 sectors.......... {:>10}", tally.mode1);
    eprintln!("Mode 2 form 1 sectors... {:>10}", tally.mode2_form1);
    eprintln!("Mode 2 form 2 sectors... {:>10}", tally.mode2_form2);
}
