//! Multi-timeframe convergence classification.
//!
//! Compares the latest daily and weekly channel signals for one instrument
//! and classifies the combined state. Only the most recent bar of each
//! frame is consulted.

use crate::domain::{Crossover, Signal};
use crate::frame::ChannelFrame;
use serde::{Deserialize, Serialize};

/// Combined daily/weekly classification, ordered by scan priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    /// Both timeframes bullish and the daily just crossed up — ideal entry.
    SetupBuy,
    /// Both timeframes bearish and the daily just crossed down — exit/short.
    SetupSell,
    ConvergentBuy,
    ConvergentSell,
    /// Weekly leads bullish, daily not yet confirmed.
    WaitingBullish,
    /// Daily bullish against a bearish weekly.
    CounterTrend,
    Waiting,
    Neutral,
    NoData,
}

impl ConvergenceStatus {
    /// Scan ordering: lower is higher priority.
    pub fn priority(self) -> u8 {
        match self {
            ConvergenceStatus::SetupBuy => 1,
            ConvergenceStatus::SetupSell => 2,
            ConvergenceStatus::ConvergentBuy => 3,
            ConvergenceStatus::ConvergentSell => 4,
            ConvergenceStatus::WaitingBullish => 5,
            ConvergenceStatus::CounterTrend => 6,
            ConvergenceStatus::Waiting => 7,
            ConvergenceStatus::Neutral => 8,
            ConvergenceStatus::NoData => 9,
        }
    }

    /// Display label, stable across the scan/export surface.
    pub fn label(self) -> &'static str {
        match self {
            ConvergenceStatus::SetupBuy => "🔵 SETUP COMPRA",
            ConvergenceStatus::SetupSell => "🟣 SETUP VENDA",
            ConvergenceStatus::ConvergentBuy => "🟢 COMPRA CONVERGENTE",
            ConvergenceStatus::ConvergentSell => "🔴 VENDA CONVERGENTE",
            ConvergenceStatus::WaitingBullish => "🟡 AGUARDANDO ALTA",
            ConvergenceStatus::CounterTrend => "🟠 CONTRA-TENDÊNCIA",
            ConvergenceStatus::Waiting => "🟡 AGUARDANDO",
            ConvergenceStatus::Neutral => "⚪ NEUTRO",
            ConvergenceStatus::NoData => "SEM DADOS",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConvergenceStatus::SetupBuy => "⚡ Setup ideal de compra! Diário cruzou para cima",
            ConvergenceStatus::SetupSell => "⚡ Sinal de saída! Diário cruzou para baixo",
            ConvergenceStatus::ConvergentBuy => "Ambos timeframes em tendência de alta",
            ConvergenceStatus::ConvergentSell => "Ambos timeframes em tendência de baixa",
            ConvergenceStatus::WaitingBullish => "Semanal em alta, aguardando confirmação diária",
            ConvergenceStatus::CounterTrend => "Diário em alta, mas semanal em baixa (atenção!)",
            ConvergenceStatus::Waiting => "Timeframes em direções opostas",
            ConvergenceStatus::Neutral => "Ambos timeframes neutros",
            ConvergenceStatus::NoData => "Dados insuficientes para análise",
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(
            self,
            ConvergenceStatus::SetupBuy | ConvergenceStatus::ConvergentBuy
        )
    }

    pub fn is_sell(self) -> bool {
        matches!(
            self,
            ConvergenceStatus::SetupSell | ConvergenceStatus::ConvergentSell
        )
    }

    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            ConvergenceStatus::WaitingBullish | ConvergenceStatus::Waiting
        )
    }
}

/// Direction of agreement between the two timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceType {
    Bullish,
    Bearish,
    Neutral,
    Divergent,
}

impl ConvergenceType {
    /// Display label matching the scan/export surface.
    pub fn label(self) -> &'static str {
        match self {
            ConvergenceType::Bullish => "ALTA",
            ConvergenceType::Bearish => "BAIXA",
            ConvergenceType::Neutral => "NEUTRO",
            ConvergenceType::Divergent => "DIVERGENTE",
        }
    }
}

/// Classification of one instrument at one evaluation instant.
///
/// Built fresh per scan; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceRecord {
    pub daily_signal: Option<Signal>,
    pub weekly_signal: Option<Signal>,
    pub daily_crossover: Option<Crossover>,
    pub weekly_crossover: Option<Crossover>,
    pub is_convergent: bool,
    pub convergence_type: ConvergenceType,
    pub status: ConvergenceStatus,
    pub description: String,
}

/// Classify the latest bars of a daily and a weekly frame.
///
/// Empty frames yield a `NoData` record, never an error.
pub fn classify(daily: &ChannelFrame, weekly: &ChannelFrame) -> ConvergenceRecord {
    classify_latest(
        daily.latest_signal(),
        weekly.latest_signal(),
        daily.latest_crossover(),
        weekly.latest_crossover(),
    )
}

/// Classification over already-extracted latest states.
pub fn classify_latest(
    daily_signal: Option<Signal>,
    weekly_signal: Option<Signal>,
    daily_crossover: Option<Crossover>,
    weekly_crossover: Option<Crossover>,
) -> ConvergenceRecord {
    let mut record = ConvergenceRecord {
        daily_signal,
        weekly_signal,
        daily_crossover,
        weekly_crossover,
        is_convergent: false,
        convergence_type: ConvergenceType::Divergent,
        status: ConvergenceStatus::Waiting,
        description: String::new(),
    };

    let (d, w) = match (daily_signal, weekly_signal) {
        (Some(d), Some(w)) => (d, w),
        _ => {
            record.status = ConvergenceStatus::NoData;
            record.description = record.status.description().to_string();
            return record;
        }
    };

    record.is_convergent = d == w;
    record.status = match (w, d) {
        (Signal::Bullish, Signal::Bullish) => {
            record.convergence_type = ConvergenceType::Bullish;
            if daily_crossover == Some(Crossover::BullishCross) {
                ConvergenceStatus::SetupBuy
            } else {
                ConvergenceStatus::ConvergentBuy
            }
        }
        (Signal::Bearish, Signal::Bearish) => {
            record.convergence_type = ConvergenceType::Bearish;
            if daily_crossover == Some(Crossover::BearishCross) {
                ConvergenceStatus::SetupSell
            } else {
                ConvergenceStatus::ConvergentSell
            }
        }
        (Signal::Neutral, Signal::Neutral) => {
            record.convergence_type = ConvergenceType::Neutral;
            ConvergenceStatus::Neutral
        }
        (Signal::Bullish, Signal::Bearish) => ConvergenceStatus::WaitingBullish,
        (Signal::Bearish, Signal::Bullish) => ConvergenceStatus::CounterTrend,
        _ => ConvergenceStatus::Waiting,
    };
    record.description = record.status.description().to_string();
    record
}
