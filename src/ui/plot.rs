use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::color::{generate_palette, ColorMap};
use crate::data::model::{col, CellValue, Passenger, PassengerTable};
use crate::data::stats;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

/// The canned charts. Each variant maps to one render function below; the
/// selector in the side panel iterates `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SurvivalCounts,
    SurvivalBySex,
    SurvivalByClass,
    AgeHistogram,
    FareByClass,
    FamilySizeCounts,
    FareVsAge,
    SurvivalByDeck,
    TitleCounts,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::SurvivalCounts,
        ChartKind::SurvivalBySex,
        ChartKind::SurvivalByClass,
        ChartKind::AgeHistogram,
        ChartKind::FareByClass,
        ChartKind::FamilySizeCounts,
        ChartKind::FareVsAge,
        ChartKind::SurvivalByDeck,
        ChartKind::TitleCounts,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::SurvivalCounts => "Overall Survival Rate",
            ChartKind::SurvivalBySex => "Survival Rate by Sex",
            ChartKind::SurvivalByClass => "Survival Rate by Passenger Class",
            ChartKind::AgeHistogram => "Age Distribution",
            ChartKind::FareByClass => "Fare Distribution by Class",
            ChartKind::FamilySizeCounts => "Family Size Distribution",
            ChartKind::FareVsAge => "Fare vs. Age",
            ChartKind::SurvivalByDeck => "Survival Rate by Deck",
            ChartKind::TitleCounts => "Title Distribution",
        }
    }

    /// Render this chart from the rows selected by `indices`.
    pub fn render(self, ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
        match self {
            ChartKind::SurvivalCounts => survival_counts(ui, table, indices),
            ChartKind::SurvivalBySex => {
                survival_by_category(ui, table, indices, "survival_by_sex", |p| {
                    p.sex.clone()
                })
            }
            ChartKind::SurvivalByClass => {
                survival_by_category(ui, table, indices, "survival_by_class", |p| {
                    p.pclass.map(|c| c.to_string())
                })
            }
            ChartKind::AgeHistogram => age_histogram(ui, table, indices),
            ChartKind::FareByClass => fare_by_class(ui, table, indices),
            ChartKind::FamilySizeCounts => family_size_counts(ui, table, indices),
            ChartKind::FareVsAge => fare_vs_age(ui, table, indices),
            ChartKind::SurvivalByDeck => {
                survival_by_category(ui, table, indices, "survival_by_deck", |p| {
                    p.deck.clone()
                })
            }
            ChartKind::TitleCounts => title_counts(ui, table, indices),
        }
    }
}

fn rows<'a>(
    table: &'a PassengerTable,
    indices: &'a [usize],
) -> impl Iterator<Item = &'a Passenger> + 'a {
    indices.iter().map(|&i| &table.passengers[i])
}

const DIED_COLOR: Color32 = Color32::from_rgb(0x44, 0x5c, 0x77);
const SURVIVED_COLOR: Color32 = Color32::from_rgb(0x5d, 0xb3, 0x6a);

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

fn survival_counts(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let mut died = 0.0;
    let mut survived = 0.0;
    for p in rows(table, indices) {
        match p.survived {
            Some(0) => died += 1.0,
            Some(_) => survived += 1.0,
            None => {}
        }
    }

    let bars = vec![
        Bar::new(0.0, died).name("No").fill(DIED_COLOR).width(0.6),
        Bar::new(1.0, survived)
            .name("Yes")
            .fill(SURVIVED_COLOR)
            .width(0.6),
    ];

    Plot::new("survival_counts")
        .legend(Legend::default())
        .x_axis_label("Survived (0 = No, 1 = Yes)")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Passengers"));
        });
}

/// Grouped died/survived bars per category value. Categories are sorted;
/// rows with a missing category or survival flag are skipped.
fn survival_by_category(
    ui: &mut Ui,
    table: &PassengerTable,
    indices: &[usize],
    plot_id: &str,
    category: impl Fn(&Passenger) -> Option<String>,
) {
    let mut counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for p in rows(table, indices) {
        let (Some(cat), Some(flag)) = (category(p), p.survived) else {
            continue;
        };
        let entry = counts.entry(cat).or_insert((0.0, 0.0));
        if flag == 0 {
            entry.0 += 1.0;
        } else {
            entry.1 += 1.0;
        }
    }

    let mut died_bars = Vec::with_capacity(counts.len());
    let mut survived_bars = Vec::with_capacity(counts.len());
    for (i, (cat, (died, survived))) in counts.iter().enumerate() {
        let x = i as f64;
        died_bars.push(Bar::new(x - 0.2, *died).name(cat).width(0.35));
        survived_bars.push(Bar::new(x + 0.2, *survived).name(cat).width(0.35));
    }

    Plot::new(plot_id.to_string())
        .legend(Legend::default())
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(died_bars).name("No").color(DIED_COLOR));
            plot_ui.bar_chart(
                BarChart::new(survived_bars)
                    .name("Yes")
                    .color(SURVIVED_COLOR),
            );
        });
}

fn age_histogram(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let ages: Vec<f64> = rows(table, indices).filter_map(|p| p.age).collect();
    if ages.is_empty() {
        ui.label("No age data in the current selection.");
        return;
    }

    const BINS: usize = 30;
    let min = ages.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);
    let bin_width = span / BINS as f64;

    let mut counts = [0usize; BINS];
    for &age in &ages {
        let bin = (((age - min) / bin_width) as usize).min(BINS - 1);
        counts[bin] += 1;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let center = min + (i as f64 + 0.5) * bin_width;
            Bar::new(center, n as f64)
                .width(bin_width)
                .fill(Color32::from_rgb(0x87, 0xce, 0xeb))
        })
        .collect();

    Plot::new("age_histogram")
        .x_axis_label("Age")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Age"));
        });
}

/// Box-and-whisker of fares per passenger class (min, quartiles, max).
fn fare_by_class(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let mut by_class: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for p in rows(table, indices) {
        if let (Some(class), Some(fare)) = (p.pclass, p.fare) {
            by_class.entry(class).or_default().push(fare);
        }
    }
    if by_class.is_empty() {
        ui.label("No fare data in the current selection.");
        return;
    }

    let palette = generate_palette(by_class.len());
    let boxes: Vec<BoxElem> = by_class
        .iter()
        .zip(palette)
        .filter_map(|((class, fares), color)| {
            let spread = BoxSpread::new(
                stats::quantile(fares, 0.0)?,
                stats::quantile(fares, 0.25)?,
                stats::quantile(fares, 0.5)?,
                stats::quantile(fares, 0.75)?,
                stats::quantile(fares, 1.0)?,
            );
            Some(
                BoxElem::new(*class as f64, spread)
                    .name(format!("Class {class}"))
                    .fill(color.gamma_multiply(0.6))
                    .box_width(0.5),
            )
        })
        .collect();

    Plot::new("fare_by_class")
        .legend(Legend::default())
        .x_axis_label("Passenger Class")
        .y_axis_label("Fare")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name("Fare"));
        });
}

fn family_size_counts(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for p in rows(table, indices) {
        if let Some(size) = p.family_size {
            *counts.entry(size).or_default() += 1;
        }
    }

    let bars: Vec<Bar> = counts
        .iter()
        .map(|(&size, &n)| {
            Bar::new(size as f64, n as f64)
                .width(0.6)
                .fill(Color32::from_rgb(0x6a, 0x8c, 0xaf))
        })
        .collect();

    Plot::new("family_size_counts")
        .x_axis_label("Family Size")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Families"));
        });
}

fn fare_vs_age(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let mut died: Vec<[f64; 2]> = Vec::new();
    let mut survived: Vec<[f64; 2]> = Vec::new();
    for p in rows(table, indices) {
        let (Some(age), Some(fare)) = (p.age, p.fare) else {
            continue;
        };
        match p.survived {
            Some(0) => died.push([age, fare]),
            Some(_) => survived.push([age, fare]),
            None => {}
        }
    }

    Plot::new("fare_vs_age")
        .legend(Legend::default())
        .x_axis_label("Age")
        .y_axis_label("Fare")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::new(died))
                    .name("No")
                    .color(DIED_COLOR)
                    .radius(2.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(survived))
                    .name("Yes")
                    .color(SURVIVED_COLOR)
                    .radius(2.5),
            );
        });
}

/// One coloured series per title, ordered by count (descending) like a
/// value-counts bar chart; the legend doubles as the axis labels.
fn title_counts(ui: &mut Ui, table: &PassengerTable, indices: &[usize]) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for p in rows(table, indices) {
        if let Some(title) = &p.title {
            *counts.entry(title.clone()).or_default() += 1;
        }
    }
    if counts.is_empty() {
        ui.label("No titles in the current selection.");
        return;
    }

    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    // Colour by the full table's title index so hues stay stable while the
    // filters change the selection.
    let colors = table
        .unique_values
        .get(col::TITLE)
        .map(|values| ColorMap::new(col::TITLE, values));

    Plot::new("title_counts")
        .legend(Legend::default())
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            for (i, (title, n)) in ordered.iter().enumerate() {
                let color = colors
                    .as_ref()
                    .map(|map| map.color_for(&CellValue::String(title.clone())))
                    .unwrap_or(Color32::GRAY);
                let bar = Bar::new(i as f64, *n as f64)
                    .name(title)
                    .width(0.6)
                    .fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(title).color(color));
            }
        });
}
