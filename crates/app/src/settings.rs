use snaptrack_domain::{DateWindow, HistoryFilter, ShareOptions, WeightUnit};

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;

    async fn update_settings(
        &self,
        update: impl FnOnce(&mut Settings),
    ) -> Result<Settings, String> {
        let mut settings = self.get_settings().await?;
        update(&mut settings);
        self.set_settings(settings).await?;
        Ok(settings)
    }
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(with = "WeightUnitDef")]
    pub weight_unit: WeightUnit,
    pub show_effort: bool,
    #[serde(with = "DateWindowDef")]
    pub history_window: DateWindow,
}

impl Settings {
    /// Initial history filter, restricted to the preferred date window.
    #[must_use]
    pub fn history_filter(&self) -> HistoryFilter {
        HistoryFilter {
            window: self.history_window,
            ..HistoryFilter::default()
        }
    }

    #[must_use]
    pub fn share_options(&self) -> ShareOptions {
        ShareOptions {
            show_effort: self.show_effort,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Lbs,
            show_effort: true,
            history_window: DateWindow::All,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(remote = "WeightUnit")]
enum WeightUnitDef {
    Lbs,
    Kg,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(remote = "DateWindow")]
enum DateWindowDef {
    All,
    Week,
    Month,
    ThreeMonths,
}
