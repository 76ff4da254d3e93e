//! Pure rendering of a unit's [`RequestState`] into a display tree.
//!
//! [`render`] never performs I/O and depends only on its arguments, so the
//! same state always yields the same [`View`]. The tree implements
//! [`Display`](fmt::Display) as a plain-text panel for terminal output.

use std::fmt;

use serde_json::Value;

use crate::{
    model::{
        Astro, CurrentPayload, HistoricalPayload, MarineDay, MarinePayload, Payload, display,
        view,
    },
    state::RequestState,
    unit::UnitKind,
};

/// Forecast days shown by the marine unit.
pub const MARINE_DAYS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Empty,
    Loading,
    Error(String),
    Panel(Panel),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    pub heading: String,
    pub subtitles: Vec<String>,
    pub icon: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub details: Vec<Detail>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub details: Vec<Detail>,
    /// Free-form lines, e.g. one per tide.
    pub rows: Vec<String>,
    pub children: Vec<Section>,
}

fn detail(label: &'static str, value: Option<&Value>, unit: &str) -> Detail {
    Detail { label, value: format!("{}{unit}", display(value)) }
}

pub fn render(kind: UnitKind, state: &RequestState) -> View {
    match state {
        RequestState::Idle => View::Empty,
        RequestState::Loading => View::Loading,
        RequestState::Failure(message) => View::Error(message.clone()),
        RequestState::Success(payload) => match kind {
            UnitKind::Current => render_current(payload),
            UnitKind::Historical => render_historical(payload),
            UnitKind::Marine => render_marine(payload),
        },
    }
}

fn render_current(payload: &Payload) -> View {
    let data: CurrentPayload = view(payload);
    let mut panel = Panel::default();

    if let Some(location) = &data.location {
        panel.heading = display(location.name.as_ref());
        panel.subtitles = vec![
            format!("{} - {}", display(location.country.as_ref()), display(location.region.as_ref())),
            display(location.localtime.as_ref()),
        ];
    }

    if let Some(current) = &data.current {
        panel.icon = current.weather_icons.as_ref().and_then(|v| v.first()).map(|v| display(Some(v)));
        panel.headline = Some(format!("{}°C", display(current.temperature.as_ref())));
        panel.description = current.weather_descriptions.as_ref().and_then(|v| v.first()).map(|v| display(Some(v)));
        panel.details = vec![
            detail("Feels Like", current.feelslike.as_ref(), "°C"),
            detail("Humidity", current.humidity.as_ref(), "%"),
            detail("Wind Speed", current.wind_speed.as_ref(), " km/h"),
            detail("Wind Direction", current.wind_dir.as_ref(), ""),
            detail("Pressure", current.pressure.as_ref(), " MB"),
            detail("Visibility", current.visibility.as_ref(), " km"),
            detail("UV Index", current.uv_index.as_ref(), ""),
            detail("Cloud Cover", current.cloudcover.as_ref(), "%"),
        ];
    }

    View::Panel(panel)
}

fn astro_section(astro: &Astro, with_illumination: bool) -> Section {
    let mut details = vec![
        detail("Sunrise", astro.sunrise.as_ref(), ""),
        detail("Sunset", astro.sunset.as_ref(), ""),
        detail("Moon Phase", astro.moon_phase.as_ref(), ""),
    ];
    if with_illumination {
        details.push(detail("Moon Illumination", astro.moon_illumination.as_ref(), "%"));
    }

    Section { title: "Astronomical Data".into(), details, ..Section::default() }
}

fn render_historical(payload: &Payload) -> View {
    let data: HistoricalPayload = view(payload);
    if data.historical.is_none() {
        return View::Empty;
    }
    let mut panel = Panel::default();

    if let Some(location) = &data.location {
        panel.heading = display(location.name.as_ref());
        panel.subtitles = vec![format!(
            "{} - {}",
            display(location.country.as_ref()),
            display(location.region.as_ref())
        )];
    }

    panel.sections = data
        .days()
        .into_iter()
        .map(|(date, day)| Section {
            title: date.to_string(),
            details: vec![
                detail("Min Temp", day.mintemp.as_ref(), "°C"),
                detail("Max Temp", day.maxtemp.as_ref(), "°C"),
                detail("Avg Temp", day.avgtemp.as_ref(), "°C"),
                detail("Sun Hours", day.sunhour.as_ref(), "h"),
                detail("UV Index", day.uv_index.as_ref(), ""),
                detail("Total Snow", day.totalsnow.as_ref(), " cm"),
            ],
            rows: Vec::new(),
            children: day.astro.as_ref().map(|a| astro_section(a, true)).into_iter().collect(),
        })
        .collect();

    View::Panel(panel)
}

fn marine_day(day: &MarineDay) -> Section {
    let mut children = Vec::new();

    if let Some(astro) = &day.astro {
        children.push(astro_section(astro, false));
    }

    if let Some(tides) = day.tides.as_ref().filter(|t| !t.is_empty()) {
        children.push(Section {
            title: "Tide Information".into(),
            rows: tides
                .iter()
                .map(|t| {
                    format!(
                        "{}  {}  {}m",
                        display(t.tide_time.as_ref()),
                        display(t.tide_type.as_ref()),
                        display(t.tide_height_mt.as_ref())
                    )
                })
                .collect(),
            ..Section::default()
        });
    }

    if let Some(hour) = day.hourly.as_ref().and_then(|h| h.first()) {
        children.push(Section {
            title: "Marine Conditions (First Reading)".into(),
            details: vec![
                detail("Water Temp", hour.water_temp.as_ref(), "°C"),
                detail("Wave Height", hour.sig_height_m.as_ref(), "m"),
                detail("Swell Height", hour.swell_height.as_ref(), "m"),
                detail("Swell Direction", hour.swell_dir_16_point.as_ref(), ""),
                detail("Wind Speed", hour.wind_speed.as_ref(), " km/h"),
                detail("Visibility", hour.visibility.as_ref(), " km"),
            ],
            ..Section::default()
        });
    }

    Section {
        title: display(day.date.as_ref()),
        details: vec![
            detail("Min Temp", day.mintemp.as_ref(), "°C"),
            detail("Max Temp", day.maxtemp.as_ref(), "°C"),
            detail("Avg Temp", day.avgtemp.as_ref(), "°C"),
            detail("UV Index", day.uv_index.as_ref(), ""),
        ],
        rows: Vec::new(),
        children,
    }
}

fn render_marine(payload: &Payload) -> View {
    let data: MarinePayload = view(payload);
    let Some(forecast) = &data.forecast else {
        return View::Empty;
    };

    View::Panel(Panel {
        heading: "Marine Weather Forecast".into(),
        subtitles: vec![display(data.request.as_ref().and_then(|r| r.query.as_ref()))],
        sections: forecast.iter().take(MARINE_DAYS).map(marine_day).collect(),
        ..Panel::default()
    })
}

fn write_details(f: &mut fmt::Formatter<'_>, details: &[Detail], indent: usize) -> fmt::Result {
    let width = details.iter().map(|d| d.label.len()).max().unwrap_or(0);
    for d in details {
        writeln!(f, "{:indent$}{:<width$}  {}", "", d.label, d.value)?;
    }
    Ok(())
}

fn write_section(f: &mut fmt::Formatter<'_>, section: &Section, indent: usize) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{:indent$}{}", "", section.title)?;
    writeln!(f, "{:indent$}{}", "", "-".repeat(section.title.chars().count()))?;
    write_details(f, &section.details, indent)?;
    for row in &section.rows {
        writeln!(f, "{:indent$}{row}", "")?;
    }
    for child in &section.children {
        write_section(f, child, indent + 2)?;
    }
    Ok(())
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "{}", "=".repeat(self.heading.chars().count()))?;
        for line in &self.subtitles {
            writeln!(f, "{line}")?;
        }

        if let Some(headline) = &self.headline {
            writeln!(f)?;
            match &self.description {
                Some(description) => writeln!(f, "{headline}  {description}")?,
                None => writeln!(f, "{headline}")?,
            }
        }
        if let Some(icon) = &self.icon {
            writeln!(f, "icon: {icon}")?;
        }

        if !self.details.is_empty() {
            writeln!(f)?;
            write_details(f, &self.details, 0)?;
        }

        for section in &self.sections {
            write_section(f, section, 0)?;
        }
        Ok(())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Empty => Ok(()),
            View::Loading => writeln!(f, "Loading..."),
            View::Error(message) => writeln!(f, "Error: {message}"),
            View::Panel(panel) => fmt::Display::fmt(panel, f),
        }
    }
}
