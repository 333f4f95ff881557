use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::save_csv;
use crate::data::filter::apply_filters;
use crate::data::model::{col, CellValue, PassengerTable};
use crate::state::{AppState, Page};
use crate::ui::plot::ChartKind;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar: file menu, page navigation, counts and
/// the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.cache.invalidate();
                if let Some(path) = state.source_path.clone() {
                    state.load_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            if ui
                .selectable_label(state.page == page, page.label())
                .clicked()
            {
                state.page = page;
            }
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} passengers loaded, {} visible",
                table.len(),
                state.visible.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – per-page controls
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.label());
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        ui.label("Open a CSV or JSON file via File → Open…");
        return;
    }

    match state.page {
        Page::Overview => {
            if let Some(path) = &state.source_path {
                ui.label(format!("Source: {}", path.display()));
            }
        }
        Page::Visualization | Page::Interactive => {
            chart_selector(ui, state);
            if state.page == Page::Interactive {
                ui.separator();
                filter_controls(ui, state);
            }
        }
        Page::Cleaning => cleaning_controls(ui, state),
    }
}

fn chart_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Chart");
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(state.chart.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut state.chart, kind, kind.label());
            }
        });
}

/// The filter widgets. Any change re-runs the filter pass against the
/// cached table.
fn filter_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    // Clone the dropdown options so the controls can be mutated in the loop.
    let sexes = string_options(table, col::SEX);
    let classes = int_options(table, col::PCLASS);
    let ports = string_options(table, col::EMBARKED);

    let mut changed = false;
    let mut do_reset = false;
    let mut do_save = false;

    {
        let Some(controls) = &mut state.controls else {
            return;
        };

        ui.strong("Filters");

        changed |= category_combo(ui, "filter_sex", "Sex", &mut controls.sex, &sexes);
        changed |= category_combo(ui, "filter_pclass", "Class", &mut controls.pclass, &classes);
        changed |= category_combo(
            ui,
            "filter_embarked",
            "Embarked",
            &mut controls.embarked,
            &ports,
        );

        ui.add_space(4.0);

        let (age_lo, age_hi) = controls.age_bounds;
        ui.label("Age");
        changed |= ui
            .add(Slider::new(&mut controls.age.0, age_lo..=age_hi).text("min"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut controls.age.1, age_lo..=age_hi).text("max"))
            .changed();

        let (fare_lo, fare_hi) = controls.fare_bounds;
        ui.label("Fare");
        changed |= ui
            .add(Slider::new(&mut controls.fare.0, fare_lo..=fare_hi).text("min"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut controls.fare.1, fare_lo..=fare_hi).text("max"))
            .changed();

        let (fam_lo, fam_hi) = controls.family_bounds;
        ui.label("Family size");
        changed |= ui
            .add(Slider::new(&mut controls.family.0, fam_lo..=fam_hi).text("min"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut controls.family.1, fam_lo..=fam_hi).text("max"))
            .changed();

        ui.add_space(4.0);
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Reset").clicked() {
                do_reset = true;
            }
            if ui.button("Download CSV…").clicked() {
                do_save = true;
            }
        });
    }

    if do_reset {
        state.reset_filters();
    } else if changed {
        state.refilter();
    }
    if do_save {
        save_filtered_dialog(state);
    }
}

/// "All" + one entry per distinct value. Returns whether the selection
/// changed.
fn category_combo<T: Clone + PartialEq + std::fmt::Display>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    selection: &mut Option<T>,
    options: &[T],
) -> bool {
    let mut changed = false;
    let selected_text = selection
        .as_ref()
        .map_or_else(|| "All".to_string(), |v| v.to_string());

    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id.to_string())
            .selected_text(selected_text)
            .show_ui(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(selection.is_none(), "All")
                    .clicked()
                {
                    *selection = None;
                    changed = true;
                }
                for option in options {
                    let is_selected = selection.as_ref() == Some(option);
                    if ui
                        .selectable_label(is_selected, option.to_string())
                        .clicked()
                    {
                        *selection = Some(option.clone());
                        changed = true;
                    }
                }
            });
    });
    changed
}

fn string_options(table: &PassengerTable, column: &str) -> Vec<String> {
    table
        .unique_values
        .get(column)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| match v {
                    CellValue::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn int_options(table: &PassengerTable, column: &str) -> Vec<i64> {
    table
        .unique_values
        .get(column)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| match v {
                    CellValue::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cleaning_controls(ui: &mut Ui, state: &mut AppState) {
    if ui.button("Run cleaning").clicked() {
        state.run_cleaning();
    }

    if let Some(report) = &state.clean_report {
        ui.add_space(4.0);
        match report.age_median {
            Some(median) => ui.label(format!(
                "Filled {} missing Age values with median {median}",
                report.ages_filled
            )),
            None => ui.label("No ages present to impute"),
        };
        match &report.embarked_mode {
            Some(mode) => ui.label(format!(
                "Filled {} missing Embarked values with mode {mode}",
                report.embarked_filled
            )),
            None => ui.label("No embarkation ports present to impute"),
        };
    }

    if state.cleaned.is_some() {
        ui.add_space(4.0);
        if ui.button("Save cleaned CSV…").clicked() {
            save_cleaned_dialog(state);
        }
    }
}

// ---------------------------------------------------------------------------
// Data table widget
// ---------------------------------------------------------------------------

/// Spreadsheet-style preview of the rows selected by `indices`, capped at
/// `max_rows`.
pub fn data_table(ui: &mut Ui, table: &PassengerTable, indices: &[usize], max_rows: usize) {
    let shown = &indices[..indices.len().min(max_rows)];

    ScrollArea::horizontal()
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(Column::auto().resizable(true), table.columns.len())
                .header(20.0, |mut header| {
                    for column in &table.columns {
                        header.col(|ui| {
                            ui.strong(column.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for &idx in shown {
                        let passenger = &table.passengers[idx];
                        body.row(18.0, |mut row| {
                            for column in &table.columns {
                                row.col(|ui| {
                                    ui.label(passenger.value(column).to_string());
                                });
                            }
                        });
                    }
                });
        });

    if indices.len() > max_rows {
        ui.label(format!("Showing {max_rows} of {} rows", indices.len()));
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open passenger data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn save_filtered_dialog(state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name("filtered_titanic_data.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let spec = state
        .controls
        .as_ref()
        .map(|c| c.to_spec())
        .unwrap_or_default();
    let (subset, count) = apply_filters(table, &spec);
    match save_csv(&subset, &path) {
        Ok(()) => {
            log::info!("Saved {count} filtered rows to {}", path.display());
            state.status_message = Some(format!("Saved {count} rows to {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to save filtered data: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn save_cleaned_dialog(state: &mut AppState) {
    let Some(cleaned) = &state.cleaned else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save cleaned data")
        .set_file_name("titanic_cleaned.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match save_csv(cleaned, &path) {
        Ok(()) => {
            log::info!("Saved cleaned table to {}", path.display());
            state.status_message = Some(format!("Saved cleaned data to {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to save cleaned data: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
