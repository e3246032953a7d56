// HTTP sensor API data source
use crate::application::data_source::{DataSource, FeedQuery, FetchError};
use crate::domain::reading::Reading;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HttpSensorSource {
    base_url: String,
    client: reqwest::Client,
}

/// Reading as served by the sensor API. Every field may be missing.
#[derive(Debug, Deserialize)]
struct WireReading {
    #[serde(default)]
    node_name: Option<String>,
    #[serde(default)]
    node_id: Option<serde_json::Value>,
    #[serde(default)]
    sensor_id: Option<i64>,
    #[serde(default)]
    x_value: Option<f64>,
    #[serde(default)]
    time_t: Option<f64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedReading {
    #[error("reading has no origin (node_name or node_id)")]
    MissingOrigin,
    #[error("reading from {0} has no sensor_id")]
    MissingSensorId(String),
    #[error("reading from {0} has no x_value")]
    MissingValue(String),
    #[error("reading from {0} has no time_t")]
    MissingTimestamp(String),
}

impl TryFrom<WireReading> for Reading {
    type Error = MalformedReading;

    fn try_from(wire: WireReading) -> Result<Self, Self::Error> {
        let origin = wire
            .node_name
            .or_else(|| match wire.node_id {
                Some(serde_json::Value::String(id)) => Some(id),
                Some(serde_json::Value::Number(id)) => Some(id.to_string()),
                _ => None,
            })
            .ok_or(MalformedReading::MissingOrigin)?;

        let sensor_id = wire
            .sensor_id
            .ok_or_else(|| MalformedReading::MissingSensorId(origin.clone()))?;
        let value = wire
            .x_value
            .ok_or_else(|| MalformedReading::MissingValue(origin.clone()))?;
        let timestamp = wire
            .time_t
            .ok_or_else(|| MalformedReading::MissingTimestamp(origin.clone()))?;

        Ok(Reading::new(origin, sensor_id, value, timestamp as i64))
    }
}

/// Decode a JSON array of readings, dropping malformed entries.
///
/// Entries are decoded one at a time so a badly typed entry only costs
/// itself; a body that is not an array is an error.
pub fn decode_readings(body: &str) -> Result<Vec<Reading>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(body)?;

    let readings = entries
        .into_iter()
        .filter_map(|entry| {
            let decoded = serde_json::from_value::<WireReading>(entry)
                .map_err(|e| e.to_string())
                .and_then(|wire| Reading::try_from(wire).map_err(|e| e.to_string()));

            match decoded {
                Ok(reading) => Some(reading),
                Err(e) => {
                    tracing::warn!("Dropping malformed reading: {}", e);
                    None
                }
            }
        })
        .collect();

    Ok(readings)
}

impl HttpSensorSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The sensor API separates query parameters with `;`.
    fn build_url(&self, query: &FeedQuery) -> String {
        let mut params = Vec::new();
        if let Some(latest) = query.latest {
            params.push(format!("latests={}", latest));
        }
        if let Some(limit) = query.limit {
            params.push(format!("limit={}", limit));
        }
        params.push(format!("named={}", if query.named { 1 } else { 0 }));

        format!(
            "{}/{}?{}",
            self.base_url,
            query.endpoint.trim_start_matches('/'),
            params.join(";")
        )
    }
}

#[async_trait]
impl DataSource for HttpSensorSource {
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Reading>, FetchError> {
        let url = self.build_url(query);
        tracing::debug!("Fetching readings from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let readings = decode_readings(&body)?;
        tracing::debug!("Fetched {} readings from {}", readings.len(), query.endpoint);

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/sensors", addr)
    }

    #[test]
    fn test_build_url() {
        let source = HttpSensorSource::new("http://192.168.1.19:4242/sensors/".to_string());

        let mut query = FeedQuery::new("indoor_temp");
        query.latest = Some(1);
        assert_eq!(
            source.build_url(&query),
            "http://192.168.1.19:4242/sensors/indoor_temp?latests=1;named=1"
        );

        let mut query = FeedQuery::new("indoor_temp");
        query.limit = Some(100000);
        query.named = false;
        assert_eq!(
            source.build_url(&query),
            "http://192.168.1.19:4242/sensors/indoor_temp?limit=100000;named=0"
        );
    }

    #[test]
    fn test_decode_readings() {
        let body = r#"[
            {"node_name": "kitchen", "sensor_id": 1, "x_value": 21.5, "time_t": 1600000000},
            {"node_id": 7, "sensor_id": 2, "x_value": 40.0, "time_t": 1600000001.7}
        ]"#;

        let readings = decode_readings(body).unwrap();
        assert_eq!(
            readings,
            vec![
                Reading::new("kitchen", 1, 21.5, 1_600_000_000),
                Reading::new("7", 2, 40.0, 1_600_000_001),
            ]
        );
    }

    #[test]
    fn test_decode_drops_malformed_readings() {
        let body = r#"[
            {"sensor_id": 1, "x_value": 21.5, "time_t": 1},
            {"node_name": "a", "x_value": 21.5, "time_t": 1},
            {"node_name": "b", "sensor_id": 1, "x_value": null, "time_t": 1},
            {"node_name": "c", "sensor_id": 1, "x_value": 1.0},
            {"node_name": "d", "sensor_id": 3, "x_value": 1.0, "time_t": 2}
        ]"#;

        let readings = decode_readings(body).unwrap();
        assert_eq!(readings, vec![Reading::new("d", 3, 1.0, 2)]);
    }

    #[test]
    fn test_decode_drops_badly_typed_entries() {
        let body = r#"[
            {"node_name": "good", "sensor_id": 1, "x_value": 21.5, "time_t": 1},
            {"node_name": "bad", "sensor_id": "x", "x_value": 21.5, "time_t": 1},
            {"node_name": "bad", "sensor_id": 2, "x_value": "21.5", "time_t": 1},
            null,
            42
        ]"#;

        let readings = decode_readings(body).unwrap();
        assert_eq!(readings, vec![Reading::new("good", 1, 21.5, 1)]);
    }

    #[test]
    fn test_malformed_reasons() {
        let wire: WireReading =
            serde_json::from_str(r#"{"node_name": "a", "x_value": 1.0}"#).unwrap();
        assert_eq!(
            Reading::try_from(wire),
            Err(MalformedReading::MissingSensorId("a".to_string()))
        );

        let wire: WireReading =
            serde_json::from_str(r#"{"node_id": true, "sensor_id": 1}"#).unwrap();
        assert_eq!(Reading::try_from(wire), Err(MalformedReading::MissingOrigin));
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(decode_readings(r#"{"error": "nope"}"#).is_err());
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let router = Router::new().route(
            "/sensors/indoor_temp",
            get(|| async {
                r#"[{"node_name": "hall", "sensor_id": 4, "x_value": 19.0, "time_t": 100}]"#
            }),
        );
        let source = HttpSensorSource::new(serve(router).await);

        let readings = source.fetch(&FeedQuery::new("indoor_temp")).await.unwrap();
        assert_eq!(readings, vec![Reading::new("hall", 4, 19.0, 100)]);
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let router = Router::new().route(
            "/sensors/indoor_temp",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let source = HttpSensorSource::new(serve(router).await);

        match source.fetch(&FeedQuery::new("indoor_temp")).await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
