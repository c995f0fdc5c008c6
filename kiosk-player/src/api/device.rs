//! Device status endpoint
//!
//! Battery and Wi-Fi readings are mocked until the kiosk hardware is wired
//! in; mode, clock and volume are real.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

const MOCK_BATTERY_PERCENT: u8 = 82;
const MOCK_WIFI_STRENGTH: u8 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Battery {
    pub percent: u8,
    pub charging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wifi {
    pub connected: bool,
    /// 0-100
    pub strength: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub mode: String,
    /// Local wall clock, HH:MM
    pub time: String,
    pub battery: Battery,
    pub wifi: Wifi,
    pub volume: u8,
    pub muted: bool,
}

/// GET /api/status
pub async fn device_status(State(state): State<AppState>) -> Json<DeviceStatus> {
    let player = state.control.status();

    Json(DeviceStatus {
        mode: state.device_mode.clone(),
        time: chrono::Local::now().format("%H:%M").to_string(),
        battery: Battery {
            percent: MOCK_BATTERY_PERCENT,
            charging: false,
        },
        wifi: Wifi {
            connected: true,
            strength: MOCK_WIFI_STRENGTH,
        },
        volume: player.volume,
        muted: player.muted,
    })
}
