#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use chainmap::{ChainMap, MapError};
use plotters::{coord::Shift, prelude::*};
use rand::{Rng, distr::Alphanumeric};

// Twelve keys fill 16 buckets exactly to the 0.75 threshold, the thirteenth crosses it
const REFERENCE_DATA: [(&str, &str); 13] = [
    ("apple", "red"),
    ("banana", "yellow"),
    ("carrot", "orange"),
    ("dog", "brown"),
    ("elephant", "gray"),
    ("frog", "green"),
    ("grape", "purple"),
    ("hat", "black"),
    ("ice cream", "white"),
    ("jacket", "blue"),
    ("kite", "pink"),
    ("lion", "golden"),
    ("moon", "silver"),
];

const RANDOM_KEYS: usize = 20_000;
const KEY_LENGTH: usize = 8;
const SAMPLE_EVERY: usize = 250;
const LOAD_FACTORS: [f64; 4] = [0.5, 0.75, 1.0, 2.0];

const FONT_FAMILY: &str = "sans-serif";
const COLORS: [RGBColor; 4] = [
    RGBColor(220, 50, 50),  // Bright red
    RGBColor(50, 90, 220),  // Bright blue
    RGBColor(50, 180, 50),  // Bright green
    RGBColor(180, 50, 180), // Bright magenta
];

#[derive(Debug, Clone, Copy)]
struct Sample {
    inserted: usize,
    average: f64,
    longest: f64,
}

#[derive(Debug)]
struct Series {
    load_factor: f64,
    samples: Vec<Sample>,
}

fn replay_reference() -> Result<(), MapError> {
    let mut map = ChainMap::new();

    for (count, &(key, value)) in REFERENCE_DATA.iter().enumerate() {
        let before = map.capacity();
        map.set(key, value)?;
        if map.capacity() != before {
            println!(
                "  '{key}' resized the table from {before} to {} buckets ({} keys)",
                map.capacity(),
                count + 1
            );
        }
    }

    println!("Reference scenario: {} keys in {} buckets", map.len(), map.capacity());
    for (key, value) in &map {
        println!("  {key} => {value}");
    }

    Ok(())
}

fn random_key(rng: &mut impl Rng) -> String {
    rng.sample_iter(Alphanumeric).take(KEY_LENGTH).map(char::from).collect()
}

fn measure(map: &ChainMap<()>, inserted: usize) -> Sample {
    let lengths = map.bucket_lengths();
    let occupied = lengths.iter().filter(|&&length| length > 0).count().max(1);
    let longest = lengths.iter().copied().max().unwrap_or(0);

    Sample { inserted, average: map.len() as f64 / occupied as f64, longest: longest as f64 }
}

fn run(keys: &[String], load_factor: f64) -> Result<Series, MapError> {
    let mut map = ChainMap::with_capacity_and_load_factor(16, load_factor);
    let mut samples = Vec::with_capacity(keys.len() / SAMPLE_EVERY);

    for (index, key) in keys.iter().enumerate() {
        map.set(key.as_str(), ())?;
        let inserted = index + 1;
        if inserted % SAMPLE_EVERY == 0 {
            samples.push(measure(&map, inserted));
        }
    }

    Ok(Series { load_factor, samples })
}

fn draw_metric(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    results: &[Series],
    metric: fn(&Sample) -> f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let max_y = results
        .iter()
        .flat_map(|series| series.samples.iter().map(metric))
        .fold(1.0, f64::max) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT_FAMILY, 30))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..RANDOM_KEYS, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Number of Keys Inserted")
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    for (series, color) in results.iter().zip(COLORS.iter()) {
        let line_style = ShapeStyle::from(color).stroke_width(2);

        chart
            .draw_series(LineSeries::new(
                series.samples.iter().map(|sample| (sample.inserted, metric(sample))),
                line_style,
            ))?
            .label(format!("load factor {}", series.load_factor))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    replay_reference()?;

    let mut rng = rand::rng();
    let keys: Vec<String> = (0..RANDOM_KEYS).map(|_| random_key(&mut rng)).collect();

    let results: Vec<Series> = LOAD_FACTORS
        .iter()
        .map(|&load_factor| run(&keys, load_factor))
        .collect::<Result<_, MapError>>()?;

    for series in &results {
        if let Some(last) = series.samples.last() {
            println!(
                "Load factor {}: {} keys, avg chain = {:.2}, longest chain = {}",
                series.load_factor, last.inserted, last.average, last.longest
            );
        }
    }

    let root = BitMapBackend::new("chain_lengths.png", (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 1));

    if let [average_area, longest_area] = areas.as_slice() {
        draw_metric(
            average_area,
            "Average Chain Length per Occupied Bucket",
            "Entries per chain",
            &results,
            |sample| sample.average,
        )?;
        draw_metric(
            longest_area,
            "Longest Chain",
            "Entries in the longest chain",
            &results,
            |sample| sample.longest,
        )?;
    }
    root.present()?;

    println!("Generated plot image: chain_lengths.png");

    Ok(())
}
