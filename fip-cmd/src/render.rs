use crate::{load_catalog, SelectionArgs};
use anyhow::Context;
use fip_core::config::Config;
use fip_db::Catalog;
use fip_session::dashboard::{toggles, views};
use fip_session::{Dashboard, SelectionChange};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::Arc;

#[derive(Serialize)]
struct Rendered<'a> {
    period: String,
    toggles: Map<String, Value>,
    views: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<&'a str>,
}

/// Build a dashboard over `catalog` and apply the selection flags.
pub fn open_dashboard(
    catalog: Catalog,
    config: &Config,
    selection: &SelectionArgs,
) -> anyhow::Result<Dashboard> {
    let mut dashboard = Dashboard::new(Arc::new(catalog), config.dashboard.clone())?;
    let mut changes = vec![
        SelectionChange::Toggle(toggles::INCLUDE_LIMA.to_string(), !selection.exclude_lima),
        SelectionChange::Toggle(
            toggles::INCLUDE_PERSONAL_LOANS.to_string(),
            selection.include_personal_loans,
        ),
    ];
    if let Some(period) = selection.period {
        changes.push(SelectionChange::Period(period));
    }
    dashboard.apply(&changes).with_context(|| {
        let periods = dashboard.periods();
        match (periods.first(), periods.last()) {
            (Some(first), Some(last)) => {
                format!("Invalid selection (available periods: {} to {})", first, last)
            }
            _ => "Invalid selection".to_string(),
        }
    })?;
    Ok(dashboard)
}

pub fn run_render<W: Write>(
    config: &Config,
    selection: &SelectionArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(load_catalog(config)?, config, selection)?;
    let mut rendered = Map::new();
    for (name, view) in dashboard.render_all()? {
        if let Some(text) = view.as_text() {
            info!("{} = {}", name, text);
        }
        debug!("{} computed {} time(s)", name, dashboard.runs(name).unwrap_or(0));
        rendered.insert(name.to_string(), serde_json::to_value(view.as_ref())?);
    }
    info!("Rendered {} views for {}", rendered.len(), dashboard.period());
    write_rendered(&dashboard, rendered, None, out)
}

pub fn run_view<W: Write>(
    config: &Config,
    name: &str,
    selection: &SelectionArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    if !views::ALL.iter().any(|known| *known == name) {
        anyhow::bail!(
            "Unknown view {:?}; expected one of: {}",
            name,
            views::ALL.join(", ")
        );
    }
    let mut dashboard = open_dashboard(load_catalog(config)?, config, selection)?;
    let view = dashboard.view(name)?;
    let mut rendered = Map::new();
    rendered.insert(name.to_string(), serde_json::to_value(view.as_ref())?);
    write_rendered(&dashboard, rendered, Some(name), out)
}

fn write_rendered<W: Write>(
    dashboard: &Dashboard,
    views: Map<String, Value>,
    view: Option<&str>,
    out: &mut W,
) -> anyhow::Result<()> {
    let toggles = dashboard
        .selection()
        .toggles()
        .map(|(name, value)| (name.to_string(), Value::Bool(value)))
        .collect();
    let rendered = Rendered {
        period: dashboard.period().to_string(),
        toggles,
        views,
        view,
    };
    serde_json::to_writer_pretty(out, &rendered)?;
    Ok(())
}
