use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::PredictStyle;
use crate::models::{
    ContestStatus, ContestSummary, PredictionOutcome, PredictionRequest, UpcomingPrediction,
};
use crate::timefmt;

use super::provider::PredictionApi;

/// HTTP client for the schedule/prediction backend.
///
/// Response parsing is deliberately tolerant: backend deployments disagree
/// on field spellings (`winner` vs `predicted_winner`, `reasoning` vs
/// `explanation`) and serve numbers both as JSON numbers and as strings.
pub struct HttpApi {
    http: Client,
    base_url: String,
    predict_style: PredictStyle,
    feed_limit: Option<u32>,
}

impl HttpApi {
    pub fn new(
        base_url: &str,
        predict_style: PredictStyle,
        feed_limit: Option<u32>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            predict_style,
            feed_limit,
        })
    }
}

#[async_trait]
impl PredictionApi for HttpApi {
    fn name(&self) -> &str {
        "backend-http"
    }

    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Vec<ContestSummary>> {
        let url = format!("{}/games?date={}", self.base_url, timefmt::date_key(date));
        debug!("Fetching schedule: {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Schedule request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Schedule endpoint error: {}", resp.status());
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse schedule response")?;

        parse_schedule_response(&raw, date)
    }

    async fn fetch_prediction(&self, request: &PredictionRequest) -> Result<PredictionOutcome> {
        let resp = match self.predict_style {
            PredictStyle::Post => {
                let url = format!("{}/predict", self.base_url);
                debug!("Requesting prediction: POST {}", url);
                self.http.post(&url).json(request).send().await
            }
            PredictStyle::Get => {
                let url = format!(
                    "{}/predict/{}?home={}&away={}",
                    self.base_url,
                    request.contest_id,
                    urlencoding::encode(&request.home_team),
                    urlencoding::encode(&request.away_team),
                );
                debug!("Requesting prediction: GET {}", url);
                self.http.get(&url).send().await
            }
        }
        .context("Prediction request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Prediction endpoint error {}: {}", status, body);
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse prediction response")?;

        parse_prediction_response(&raw)
    }

    async fn fetch_upcoming(&self) -> Result<Vec<UpcomingPrediction>> {
        let mut url = format!("{}/predictions/upcoming", self.base_url);
        if let Some(limit) = self.feed_limit {
            url.push_str(&format!("?limit={}", limit));
        }
        debug!("Fetching upcoming predictions: {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Upcoming feed request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Upcoming feed endpoint error: {}", resp.status());
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse upcoming feed response")?;

        parse_upcoming_response(&raw)
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_schedule_response(raw: &serde_json::Value, date: NaiveDate) -> Result<Vec<ContestSummary>> {
    let items = match raw.as_array() {
        Some(a) => a,
        None => {
            // Some deployments wrap the list: { "games": [...] }
            match raw.get("games").and_then(|v| v.as_array()) {
                Some(a) => a,
                None => return Ok(vec![]),
            }
        }
    };

    let contests = items
        .iter()
        .filter_map(|item| {
            let contest_id = item["gameId"]
                .as_str()
                .map(str::to_string)
                .or_else(|| item["gameId"].as_i64().map(|v| v.to_string()))?;
            let home_team = item["homeTeam"].as_str()?.to_string();
            let away_team = item["awayTeam"].as_str()?.to_string();
            let start_time = item["time"].as_str().unwrap_or("").trim().to_string();

            let status = match item["status"].as_str() {
                Some(s) if s.eq_ignore_ascii_case("final") => ContestStatus::Final,
                _ => ContestStatus::Scheduled,
            };

            Some(ContestSummary {
                contest_id,
                date,
                home_team,
                away_team,
                start_time,
                status,
                home_score: int_value(&item["homeScore"]),
                away_score: int_value(&item["awayScore"]),
            })
        })
        .collect();

    Ok(contests)
}

fn parse_prediction_response(raw: &serde_json::Value) -> Result<PredictionOutcome> {
    let winner = raw["predicted_winner"]
        .as_str()
        .or_else(|| raw["winner"].as_str())
        .context("Prediction response missing winner")?
        .to_string();

    let confidence = raw["confidence"]
        .as_u64()
        .or_else(|| raw["confidence"].as_str().and_then(|s| s.parse().ok()))
        .context("Prediction response missing confidence")?
        .min(100) as u8;

    let explanation = raw["explanation"]
        .as_str()
        .or_else(|| raw["reasoning"].as_str())
        .unwrap_or("")
        .to_string();

    Ok(PredictionOutcome {
        winner,
        confidence,
        explanation,
        pred_home_score: int_value(&raw["pred_home_score"]).unwrap_or(0),
        pred_away_score: int_value(&raw["pred_away_score"]).unwrap_or(0),
    })
}

fn parse_upcoming_response(raw: &serde_json::Value) -> Result<Vec<UpcomingPrediction>> {
    let items = match raw.as_array() {
        Some(a) => a,
        None => match raw.get("predictions").and_then(|v| v.as_array()) {
            Some(a) => a,
            None => return Ok(vec![]),
        },
    };

    Ok(items.iter().filter_map(parse_upcoming_entry).collect())
}

fn parse_upcoming_entry(item: &serde_json::Value) -> Option<UpcomingPrediction> {
    let game_date = str_field(item, &["gameDate", "game_date"])
        .and_then(|s| timefmt::parse_date_key(&s))?;
    let home_team = str_field(item, &["homeTeam", "home_team"])?;
    let away_team = str_field(item, &["awayTeam", "away_team"])?;
    let predicted_winner = str_field(item, &["predictedWinner", "predicted_winner", "winner"])?;

    let confidence = item["confidence"]
        .as_u64()
        .or_else(|| item["confidence"].as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
        .min(100) as u8;

    Some(UpcomingPrediction {
        game_date,
        home_team,
        away_team,
        predicted_winner,
        confidence,
        pred_home_score: int_field(item, &["predictedHomeScore", "pred_home_score"]).unwrap_or(0),
        pred_away_score: int_field(item, &["predictedAwayScore", "pred_away_score"]).unwrap_or(0),
    })
}

/// Accept integers served either as JSON numbers or as strings.
fn int_value(v: &serde_json::Value) -> Option<i32> {
    v.as_i64()
        .map(|n| n as i32)
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn str_field(item: &serde_json::Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| item[*name].as_str())
        .map(str::to_string)
}

fn int_field(item: &serde_json::Value, names: &[&str]) -> Option<i32> {
    names.iter().find_map(|name| int_value(&item[*name]))
}

// Minimal percent-encoding for query values; not worth a dependency
mod urlencoding {
    pub fn encode(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(c),
                c => {
                    let mut buf = [0u8; 4];
                    for b in c.encode_utf8(&mut buf).as_bytes() {
                        out.push_str(&format!("%{:02X}", b));
                    }
                }
            }
        }
        out
    }
}
