//! Loading show documents.
//!
//! Two spellings of the same description are accepted. XML:
//!
//! ```xml
//! <FireworkDisplay>
//!   <Firework begin="1000" type="Rocket" colour="0xFF0000" duration="1500">
//!     <Position x="0" y="-300"/>
//!     <Velocity x="0" y="300"/>
//!   </Firework>
//! </FireworkDisplay>
//! ```
//!
//! and JSON, `{"fireworks": [{"type": "Rocket", "begin": 1000, ...}]}` with
//! `position` / `velocity` objects. Both go through the same validation, and
//! a single bad firework rejects the whole document.

use super::{FireworkKind, ShowEvent};
use crate::color::Rgb;
use crate::config::{DEFAULT_SHOW, ShowPath};
use crate::particle::Point;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

const ROOT_ELEMENT: &str = "FireworkDisplay";

#[derive(Debug, Error)]
pub enum ShowError {
    #[error("Was not possible to read the configuration ({0}).")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Invalid configuration: {0}")]
    XmlData(#[from] quick_xml::DeError),
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration")]
    InvalidConfiguration,
    #[error("Firework {index} must have position property")]
    MissingPosition { index: usize },
    #[error("Rocket {index} must have velocity property")]
    MissingVelocity { index: usize },
    #[error("Firework {index} must have a {attribute} attribute")]
    MissingAttribute { index: usize, attribute: &'static str },
    #[error("Firework {index} has unknown type {kind:?}")]
    UnknownType { index: usize, kind: String },
    #[error("Firework {index} has an invalid {field}: {value:?}")]
    InvalidNumber { index: usize, field: &'static str, value: String },
    #[error("Firework {index} has an invalid colour: {value:?}")]
    InvalidColor { index: usize, value: String },
    #[error("Firework {index} must not have a negative {field}")]
    NegativeTime { index: usize, field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Xml,
        }
    }
}

/// Attribute values exactly as written, before validation.
#[derive(Debug, Default)]
struct RawFirework {
    kind: Option<String>,
    begin: Option<String>,
    duration: Option<String>,
    colour: Option<String>,
    position: Option<(String, String)>,
    velocity: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct XmlDisplay {
    #[serde(rename = "Firework", default)]
    fireworks: Vec<XmlFirework>,
}

#[derive(Debug, Deserialize)]
struct XmlFirework {
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "@begin")]
    begin: Option<String>,
    #[serde(rename = "@duration")]
    duration: Option<String>,
    #[serde(rename = "@colour", alias = "@color")]
    colour: Option<String>,
    #[serde(rename = "Position")]
    position: Option<XmlPoint>,
    #[serde(rename = "Velocity")]
    velocity: Option<XmlPoint>,
}

#[derive(Debug, Deserialize)]
struct XmlPoint {
    #[serde(rename = "@x", default)]
    x: String,
    #[serde(rename = "@y", default)]
    y: String,
}

impl From<XmlFirework> for RawFirework {
    fn from(f: XmlFirework) -> Self {
        RawFirework {
            kind: f.kind,
            begin: f.begin,
            duration: f.duration,
            colour: f.colour,
            position: f.position.map(|p| (p.x, p.y)),
            velocity: f.velocity.map(|p| (p.x, p.y)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonDisplay {
    #[serde(default)]
    fireworks: Vec<JsonFirework>,
}

#[derive(Debug, Deserialize)]
struct JsonFirework {
    #[serde(rename = "type")]
    kind: Option<String>,
    begin: Option<serde_json::Value>,
    duration: Option<serde_json::Value>,
    #[serde(alias = "color")]
    colour: Option<String>,
    position: Option<JsonPoint>,
    velocity: Option<JsonPoint>,
}

#[derive(Debug, Deserialize)]
struct JsonPoint {
    #[serde(default)]
    x: serde_json::Value,
    #[serde(default)]
    y: serde_json::Value,
}

fn json_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<JsonFirework> for RawFirework {
    fn from(f: JsonFirework) -> Self {
        let point = |p: JsonPoint| (json_text(p.x), json_text(p.y));
        RawFirework {
            kind: f.kind,
            begin: f.begin.map(json_text),
            duration: f.duration.map(json_text),
            colour: f.colour,
            position: f.position.map(point),
            velocity: f.velocity.map(point),
        }
    }
}

/// Integer value of an attribute; fractions truncate towards zero.
fn parse_int(index: usize, field: &'static str, value: &str) -> Result<i64, ShowError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
        .ok_or_else(|| ShowError::InvalidNumber { index, field, value: value.to_string() })
}

fn parse_time(index: usize, field: &'static str, value: Option<&str>) -> Result<u64, ShowError> {
    let value = value.ok_or(ShowError::MissingAttribute { index, attribute: field })?;
    let ms = parse_int(index, field, value)?;
    u64::try_from(ms).map_err(|_| ShowError::NegativeTime { index, field })
}

fn parse_point(index: usize, field: &'static str, (x, y): &(String, String)) -> Result<Point, ShowError> {
    let x = parse_int(index, field, x)?;
    let y = parse_int(index, field, y)?;
    Ok(Point::new(x as f32, y as f32))
}

fn validate(index: usize, raw: RawFirework) -> Result<ShowEvent, ShowError> {
    let position = raw.position.as_ref().ok_or(ShowError::MissingPosition { index })?;
    let position = parse_point(index, "position", position)?;

    let kind_name = raw.kind.ok_or(ShowError::MissingAttribute { index, attribute: "type" })?;
    let kind: FireworkKind = kind_name
        .parse()
        .map_err(|_| ShowError::UnknownType { index, kind: kind_name.clone() })?;

    let velocity = match (kind, raw.velocity.as_ref()) {
        (FireworkKind::Rocket, None) => return Err(ShowError::MissingVelocity { index }),
        (FireworkKind::Rocket, Some(v)) => Some(parse_point(index, "velocity", v)?),
        (FireworkKind::Fountain, _) => None,
    };

    let color = match raw.colour {
        Some(value) => Rgb::from_hex(&value).ok_or(ShowError::InvalidColor { index, value })?,
        None => Rgb::WHITE,
    };

    Ok(ShowEvent {
        kind,
        begin: parse_time(index, "begin", raw.begin.as_deref())?,
        duration: parse_time(index, "duration", raw.duration.as_deref())?,
        color,
        position,
        velocity,
    })
}

fn validate_all(raw: Vec<RawFirework>) -> Result<Vec<ShowEvent>, ShowError> {
    if raw.is_empty() {
        return Err(ShowError::InvalidConfiguration);
    }

    let mut events = raw
        .into_iter()
        .enumerate()
        .map(|(index, firework)| validate(index, firework))
        .collect::<Result<Vec<_>, _>>()?;

    events.sort_by_key(|event| event.begin);
    Ok(events)
}

/// Name of the first element in the document, if any.
fn root_element(doc: &str) -> Result<Option<String>, ShowError> {
    let mut reader = Reader::from_str(doc);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(Some(String::from_utf8_lossy(e.name().as_ref()).into_owned()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

pub fn parse_xml(doc: &str) -> Result<Vec<ShowEvent>, ShowError> {
    if root_element(doc)?.as_deref() != Some(ROOT_ELEMENT) {
        return Err(ShowError::InvalidConfiguration);
    }

    let display: XmlDisplay = quick_xml::de::from_str(doc)?;
    validate_all(display.fireworks.into_iter().map(RawFirework::from).collect())
}

pub fn parse_json(doc: &str) -> Result<Vec<ShowEvent>, ShowError> {
    let display: JsonDisplay = serde_json::from_str(doc)?;
    validate_all(display.fireworks.into_iter().map(RawFirework::from).collect())
}

pub fn parse(doc: &str, format: Format) -> Result<Vec<ShowEvent>, ShowError> {
    match format {
        Format::Xml => parse_xml(doc),
        Format::Json => parse_json(doc),
    }
}

/// Read and validate a show, sorted by begin time.
pub fn load(show: &ShowPath) -> Result<Vec<ShowEvent>, ShowError> {
    let events = match show {
        ShowPath::Bundled => parse_xml(DEFAULT_SHOW)?,
        ShowPath::Stdin => {
            let mut doc = String::new();
            std::io::stdin().read_to_string(&mut doc)?;
            parse_xml(&doc)?
        }
        ShowPath::File(path) => {
            let doc = std::fs::read_to_string(path)?;
            parse(&doc, Format::from_path(path))?
        }
    };

    info!(count = events.len(), source = ?show, "show loaded");
    Ok(events)
}

/// Like [`load`], but a failure becomes an empty show plus the message to
/// put in front of the user.
pub fn load_or_empty(show: &ShowPath) -> (Vec<ShowEvent>, Option<String>) {
    match load(show) {
        Ok(events) => (events, None),
        Err(err) => {
            warn!(error = %err, source = ?show, "show could not be loaded");
            (Vec::new(), Some(err.to_string()))
        }
    }
}
