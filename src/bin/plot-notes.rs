//! Piano-roll plot of a note file
//!
//! With `--round-trip` the notes are tokenized and decoded again, and the
//! reconstruction is drawn as outlines over the originals.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use plotters::prelude::*;

use notetok::format::parse_notes;
use notetok::note::{MAX_PITCH, MIN_PITCH};
use notetok::{Note, NoLossTokenizer, TokenizerConfig};

/// Half the height of a note bar, in semitones
const BAR_HALF_HEIGHT: f64 = 0.4;

#[derive(Parser, Debug)]
#[command(name = "plot-notes", about = "Draw a note file as an SVG piano roll")]
struct Args {
    /// Note file (`pitch start end velocity` per line)
    input: PathBuf,
    /// Output SVG path
    output: PathBuf,
    /// Overlay the tokenize/untokenize reconstruction
    #[arg(long)]
    round_trip: bool,
    #[arg(long, default_value_t = TokenizerConfig::default().eps)]
    eps: f64,
    #[arg(long, default_value_t = TokenizerConfig::default().n_velocity_bins)]
    velocity_bins: usize,
}

/// Time and pitch ranges covering all notes, padded by one semitone
fn plot_bounds(notes: &[Note]) -> (f64, f64, f64) {
    let max_time = notes.iter().map(|n| n.end).fold(0.0, f64::max).max(1.0);
    let (lo, hi) = notes
        .iter()
        .fold((MAX_PITCH, MIN_PITCH), |(lo, hi), n| (lo.min(n.pitch), hi.max(n.pitch)));
    if lo > hi {
        return (max_time, f64::from(MIN_PITCH), f64::from(MAX_PITCH));
    }
    (max_time, f64::from(lo) - 1.0, f64::from(hi) + 1.0)
}

fn note_bar(note: &Note, style: ShapeStyle) -> Rectangle<(f64, f64)> {
    let pitch = f64::from(note.pitch);
    Rectangle::new(
        [
            (note.start, pitch - BAR_HALF_HEIGHT),
            (note.end, pitch + BAR_HALF_HEIGHT),
        ],
        style,
    )
}

fn create_plot(args: &Args, notes: &[Note], reconstructed: Option<&[Note]>) -> Result<()> {
    let root = SVGBackend::new(&args.output, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let (max_time, min_pitch, max_pitch) = plot_bounds(notes);
    let title = match reconstructed {
        Some(_) => format!(
            "{} notes, round trip eps={}, velocity bins={}",
            notes.len(),
            args.eps,
            args.velocity_bins
        ),
        None => format!("{} notes", notes.len()),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..max_time, min_pitch..max_pitch)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Pitch")
        .x_labels(10)
        .y_labels(12)
        .draw()?;

    // Original notes, shaded by velocity
    chart.draw_series(notes.iter().map(|note| {
        let alpha = (0.2 + 0.8 * f64::from(note.velocity) / 127.0).min(1.0);
        note_bar(note, BLUE.mix(alpha).filled())
    }))?;

    if let Some(reconstructed) = reconstructed {
        chart.draw_series(
            reconstructed
                .iter()
                .map(|note| note_bar(note, RED.stroke_width(1))),
        )?;
    }

    root.present()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let notes = parse_notes(&text)?;
    info!("read {} notes from {}", notes.len(), args.input.display());

    let reconstructed = if args.round_trip {
        let tokenizer = NoLossTokenizer::new(TokenizerConfig::new(args.eps, args.velocity_bins))?;
        let tokens = tokenizer.tokenize(&notes)?;
        let decoded = tokenizer.untokenize(&tokens)?;
        info!(
            "round trip: {} tokens, {} notes reconstructed",
            tokens.len(),
            decoded.len()
        );
        Some(decoded)
    } else {
        None
    };

    create_plot(&args, &notes, reconstructed.as_deref())
        .with_context(|| format!("drawing {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
