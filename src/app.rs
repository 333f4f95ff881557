use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::PassengerTable;
use crate::data::stats;
use crate::state::{AppState, Page};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ExplorerApp {
    pub state: AppState,
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + page navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: per-page controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the current page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Overview => overview_page(ui, &self.state),
            Page::Visualization => visualization_page(ui, &self.state),
            Page::Interactive => interactive_page(ui, &self.state),
            Page::Cleaning => cleaning_page(ui, &self.state),
        });
    }
}

fn loaded_table<'a>(ui: &mut Ui, state: &'a AppState) -> Option<&'a PassengerTable> {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore the data  (File → Open…)");
        });
    }
    state.table.as_ref()
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn overview_page(ui: &mut Ui, state: &AppState) {
    let Some(table) = loaded_table(ui, state) else {
        return;
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        // ---- Metric row ----
        ui.columns(4, |cols: &mut [Ui]| {
            metric(&mut cols[0], "Total Passengers", table.len().to_string());
            metric(&mut cols[1], "Total Features", table.columns.len().to_string());
            metric(
                &mut cols[2],
                "Missing Values",
                stats::total_missing(table).to_string(),
            );
            let rate = stats::survival_rate(table)
                .map_or_else(|| "N/A".to_string(), |r| format!("{:.2}%", r * 100.0));
            metric(&mut cols[3], "Survival Rate", rate);
        });
        ui.separator();

        // ---- First rows ----
        ui.heading("First Rows");
        let head: Vec<usize> = (0..table.len().min(5)).collect();
        ui.push_id("overview_head", |ui: &mut Ui| {
            panels::data_table(ui, table, &head, 5);
        });
        ui.separator();

        // ---- Statistical summary ----
        ui.heading("Statistical Summary");
        summary_table(ui, table);
        ui.separator();

        // ---- Missing values ----
        ui.heading("Missing Values");
        let missing: Vec<(String, usize)> = stats::missing_counts(table)
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .collect();
        if missing.is_empty() {
            ui.label("No missing values.");
        } else {
            for (column, n) in &missing {
                ui.label(format!("{column}: {n}"));
            }
        }
        ui.separator();

        // ---- Unique values per categorical feature ----
        ui.heading("Unique Values per Feature");
        for (column, n) in stats::unique_counts(table) {
            ui.label(format!("{column}: {n}"));
        }
    });
}

fn visualization_page(ui: &mut Ui, state: &AppState) {
    let Some(table) = loaded_table(ui, state) else {
        return;
    };
    ui.heading(state.chart.label());
    // The visualization page always charts the full table.
    let all: Vec<usize> = (0..table.len()).collect();
    state.chart.render(ui, table, &all);
}

fn interactive_page(ui: &mut Ui, state: &AppState) {
    let Some(table) = loaded_table(ui, state) else {
        return;
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Filtered Data");
        ui.label(format!(
            "Number of Passengers after Filtering: {}",
            state.visible.len()
        ));
        ui.push_id("interactive_preview", |ui: &mut Ui| {
            panels::data_table(ui, table, &state.visible, 100);
        });
        ui.separator();

        ui.heading(state.chart.label());
        // Charts on this page react to the active filters.
        ui.set_min_height(320.0);
        state.chart.render(ui, table, &state.visible);
    });
}

fn cleaning_page(ui: &mut Ui, state: &AppState) {
    let Some(table) = loaded_table(ui, state) else {
        return;
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Missing Values Before Cleaning");
        missing_list(ui, table);
        ui.separator();

        match &state.cleaned {
            None => {
                ui.label("Run cleaning from the side panel to impute missing values");
                ui.label("(Age → median, Embarked → mode) and encode Sex / Embarked.");
            }
            Some(cleaned) => {
                ui.heading("Missing Values After Cleaning");
                missing_list(ui, cleaned);
                ui.separator();

                ui.heading("Encoded Columns");
                encoded_preview(ui, cleaned);
                ui.separator();

                ui.heading("Cleaned Data Preview");
                let head: Vec<usize> = (0..cleaned.len().min(5)).collect();
                ui.push_id("cleaned_head", |ui: &mut Ui| {
                    panels::data_table(ui, cleaned, &head, 5);
                });
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(value);
    });
}

fn missing_list(ui: &mut Ui, table: &PassengerTable) {
    let missing: Vec<(String, usize)> = stats::missing_counts(table)
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    if missing.is_empty() {
        ui.label("No missing values remaining.");
        return;
    }
    for (column, n) in &missing {
        ui.label(format!("{column}: {n} missing"));
    }
}

/// Head of the label/code column pairs, the cleaning page's spot check.
fn encoded_preview(ui: &mut Ui, cleaned: &PassengerTable) {
    const PREVIEW_COLUMNS: [&str; 4] = ["Sex", "Sex_Code", "Embarked", "Embarked_Code"];

    ui.push_id("encoded_preview", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto(), PREVIEW_COLUMNS.len())
            .header(20.0, |mut header| {
                for column in PREVIEW_COLUMNS {
                    header.col(|ui| {
                        ui.strong(column);
                    });
                }
            })
            .body(|mut body| {
                for passenger in cleaned.passengers.iter().take(5) {
                    body.row(18.0, |mut row| {
                        for column in PREVIEW_COLUMNS {
                            row.col(|ui| {
                                ui.label(passenger.value(column).to_string());
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

fn summary_table(ui: &mut Ui, table: &PassengerTable) {
    let summary = stats::numeric_summary(table);
    if summary.is_empty() {
        ui.label("No numeric columns.");
        return;
    }

    const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    ui.push_id("summary_table", |ui: &mut Ui| {
        ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .columns(Column::auto(), summary.len() + 1)
                    .header(20.0, |mut header| {
                        header.col(|_| {});
                        for column in &summary {
                            header.col(|ui| {
                                ui.strong(column.column.as_str());
                            });
                        }
                    })
                    .body(|mut body| {
                        for (i, stat) in STAT_LABELS.iter().enumerate() {
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    ui.strong(*stat);
                                });
                                for column in &summary {
                                    let value = match i {
                                        0 => Some(column.count as f64),
                                        1 => column.mean,
                                        2 => column.std_dev,
                                        3 => column.min,
                                        4 => column.q25,
                                        5 => column.median,
                                        6 => column.q75,
                                        _ => column.max,
                                    };
                                    row.col(|ui| {
                                        ui.label(
                                            value
                                                .map(|v| format!("{v:.2}"))
                                                .unwrap_or_default(),
                                        );
                                    });
                                }
                            });
                        }
                    });
            });
    });
}
