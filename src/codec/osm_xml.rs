use log::warn;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::{Coordinate, TagRecord};
use crate::errors::{Error, Result};

use super::Format;

const FORMAT_NAME: &str = "osm_xml";

pub const DEFAULT_GENERATOR: &str = "OSM Field Filler";

enum ParserState {
    Top,
    Node(TagRecord),
}

/// A standalone `<osm>` document holding the record as one new node.
pub fn to_xml(record: &TagRecord) -> String {
    to_xml_with_generator(record, DEFAULT_GENERATOR)
}

pub fn to_xml_with_generator(record: &TagRecord, generator: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<osm version=\"0.6\" generator=\"{}\">\n",
        escape(generator)
    ));
    xml.push_str(&format!(
        "  <node id=\"-1\" version=\"1\" changeset=\"-1\" visible=\"true\" lat=\"{}\" lon=\"{}\">\n",
        escape(record.coordinate.lat.as_str()),
        escape(record.coordinate.lon.as_str()),
    ));
    for (key, value) in record.to_ordered_entries() {
        xml.push_str(&format!(
            "    <tag k=\"{}\" v=\"{}\"/>\n",
            escape(key),
            escape(value)
        ));
    }
    xml.push_str("  </node>\n</osm>");
    xml
}

fn parse_node(el: &BytesStart) -> Result<TagRecord> {
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;

    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"lat" => lat = Some(attribute.unescape_value()?.into_owned()),
            b"lon" => lon = Some(attribute.unescape_value()?.into_owned()),
            _ => (),
        }
    }

    Ok(TagRecord::new(Coordinate::new(
        lat.ok_or_else(|| Error::missing_attribute("lat"))?,
        lon.ok_or_else(|| Error::missing_attribute("lon"))?,
    )))
}

fn parse_tag(el: &BytesStart) -> Result<Option<(String, String)>> {
    let mut key: Option<String> = None;
    let mut value = String::new();

    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"k" => key = Some(attribute.unescape_value()?.into_owned()),
            b"v" => value = attribute.unescape_value()?.into_owned(),
            _ => (),
        }
    }

    match key {
        Some(key) => Ok(Some((key, value))),
        None => {
            warn!("Skipping <tag> without a 'k' attribute");
            Ok(None)
        },
    }
}

/// Reads the first `<node>` of the document and its `<tag>` children in document order.
pub fn from_xml(text: &str) -> Result<TagRecord> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut state = ParserState::Top;

    loop {
        let event = reader.read_event()?;
        let self_closing = matches!(event, Event::Empty(_));
        match event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"node" => {
                    if let ParserState::Top = state {
                        let record = parse_node(&e)?;
                        if self_closing {
                            return Ok(record);
                        }
                        state = ParserState::Node(record);
                    }
                },
                b"tag" => {
                    if let ParserState::Node(record) = &mut state {
                        if let Some((key, value)) = parse_tag(&e)? {
                            record.set(key, value);
                        }
                    }
                },
                _ => (),
            },
            Event::End(e) => {
                if e.name().as_ref() == b"node" {
                    if let ParserState::Node(record) = state {
                        return Ok(record);
                    }
                }
            },
            _ => (),
        }
    }

    match state {
        ParserState::Top => Err(Error::malformed_xml("no <node> element found")),
        ParserState::Node(_) => Err(Error::malformed_xml("<node> element is never closed")),
    }
}

pub struct OsmXml {
    generator: String,
}

impl OsmXml {
    pub fn new(generator: &str) -> Self {
        OsmXml {
            generator: generator.to_string(),
        }
    }
}

impl Default for OsmXml {
    fn default() -> Self {
        OsmXml::new(DEFAULT_GENERATOR)
    }
}

impl Format for OsmXml {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn render(&self, record: &TagRecord) -> String {
        to_xml_with_generator(record, &self.generator)
    }

    fn parse(&self, text: &str) -> Result<TagRecord> {
        from_xml(text)
    }
}
