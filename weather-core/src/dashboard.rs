use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    client::WeatherClient,
    unit::{UnitKind, WeatherUnit},
};

pub const TITLE: &str = "Weather Dashboard";

/// Selector for the visible unit. Exactly one tab is selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Current,
    Historical,
    Marine,
}

impl Tab {
    pub const fn all() -> &'static [Tab] {
        &[Tab::Current, Tab::Historical, Tab::Marine]
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().endpoint()
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Tab::Current => UnitKind::Current,
            Tab::Historical => UnitKind::Historical,
            Tab::Marine => UnitKind::Marine,
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind().label()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for Tab {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        Tab::all()
            .iter()
            .copied()
            .find(|tab| tab.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown tab '{value}'. Supported tabs: current, historical, marine.")
            })
    }
}

/// Owns the three units and the tab selector. Units are kept alive while
/// hidden, so switching back shows their last state.
#[derive(Debug)]
pub struct Dashboard {
    selected: Tab,
    current: WeatherUnit,
    historical: WeatherUnit,
    marine: WeatherUnit,
}

impl Dashboard {
    /// All units share `client` and with it the single credential.
    pub fn new(client: Arc<WeatherClient>, selected: Tab) -> Self {
        Self {
            selected,
            current: WeatherUnit::new(UnitKind::Current, Arc::clone(&client)),
            historical: WeatherUnit::new(UnitKind::Historical, Arc::clone(&client)),
            marine: WeatherUnit::new(UnitKind::Marine, client),
        }
    }

    pub fn selected(&self) -> Tab {
        self.selected
    }

    pub fn select(&mut self, tab: Tab) {
        if tab != self.selected {
            debug!(from = self.selected.as_str(), to = tab.as_str(), "switching tab");
        }
        self.selected = tab;
    }

    pub fn unit(&self, tab: Tab) -> &WeatherUnit {
        match tab {
            Tab::Current => &self.current,
            Tab::Historical => &self.historical,
            Tab::Marine => &self.marine,
        }
    }

    /// The only unit that is rendered.
    pub fn active_unit(&self) -> &WeatherUnit {
        self.unit(self.selected)
    }
}
