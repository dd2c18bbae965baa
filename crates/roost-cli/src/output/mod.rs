use roost_core::responses::{ClassifyResponse, RunReport, SitesResponse, TrajectoryResponse};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

use table::{Table, TableOptions};

/// Responses that have a table view.
pub trait Tabular {
    fn to_table(&self) -> Table;
}

/// Render a response to a string in the requested format.
pub fn render<T: Serialize + Tabular>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Table => {
            let prefs = ui::prefs();
            Ok(table::render(
                &value.to_table(),
                TableOptions {
                    max_width: prefs.term_width,
                    color: prefs.table_color,
                },
            ))
        }
    }
}

/// Print a response in the requested format.
pub fn output<T: Serialize + Tabular>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print a value that only has a JSON form; `table` falls back to pretty JSON.
pub fn output_json<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Raw => serde_json::to_string(value)?,
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(value)?,
    };
    println!("{rendered}");
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), fmt_num)
}

fn fmt_num(value: f64) -> String {
    format!("{value:.3}")
}

fn fmt_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

impl Tabular for RunReport {
    fn to_table(&self) -> Table {
        let s = &self.summary;
        let mut table = Table::new(&["key", "value"]);
        table.pair("years", format!("{}..{}", s.start_year, s.end_year));
        table.pair("mode", self.mode);
        table.pair("extrapolation_policy", self.extrapolation_policy);
        table.pair("sites", self.site_count);
        table.pair("draws_used", format!("{} of {}", s.draws_used, s.draws_total));
        table.pair("mean", fmt_opt(s.mean));
        table.pair("sd", fmt_opt(s.sd));
        table.pair("median", fmt_opt(s.median));
        for q in &s.quantiles {
            table.pair(&format!("q{}", q.probability), fmt_num(q.value));
        }
        for t in &s.p_decline_at_threshold {
            table.pair(&format!("P(change <= {})", t.threshold), fmt_num(t.probability));
        }
        for c in &s.category_probabilities {
            table.pair(&format!("P({})", c.category), fmt_num(c.probability));
        }
        table.pair(
            "median_category",
            s.median_category.map_or("-", |c| c.as_str()),
        );
        table.pair("extrapolated", fmt_pct(s.extrapolated_fraction));
        for d in &s.dropped {
            table.pair(&format!("dropped ({})", d.reason), d.count);
        }
        table.pair("clamped_predictions", self.clamped_predictions);
        for w in &self.warnings {
            table.pair("warning", w);
        }
        table
    }
}

impl Tabular for TrajectoryResponse {
    fn to_table(&self) -> Table {
        let mut table = Table::new(&["site", "year", "mean", "q05", "median", "q95", "flag"]);
        for p in &self.sites {
            table.push(vec![
                p.site_id.clone(),
                p.year.to_string(),
                fmt_num(p.mean),
                fmt_num(p.q05),
                fmt_num(p.median),
                fmt_num(p.q95),
                p.extrapolation.to_string(),
            ]);
        }
        for p in &self.regional {
            table.push(vec![
                String::from("(region)"),
                p.year.to_string(),
                fmt_num(p.mean),
                fmt_num(p.q05),
                fmt_num(p.median),
                fmt_num(p.q95),
                fmt_pct(p.extrapolated_fraction),
            ]);
        }
        table
    }
}

impl Tabular for SitesResponse {
    fn to_table(&self) -> Table {
        let mut table = Table::new(&["site", "latitude", "z_latitude", "first", "last", "n"]);
        for s in &self.sites {
            table.push(vec![
                s.site_id.clone(),
                fmt_num(s.latitude),
                fmt_num(s.z_latitude),
                s.first_observed_year.to_string(),
                s.last_observed_year.to_string(),
                s.count_of_observations.to_string(),
            ]);
        }
        table
    }
}

impl Tabular for ClassifyResponse {
    fn to_table(&self) -> Table {
        let mut table = Table::new(&["percent_change", "category"]);
        table.push(vec![fmt_num(self.percent_change), self.category.to_string()]);
        table
    }
}
