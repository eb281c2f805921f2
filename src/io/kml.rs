use crate::error::HeatmapError;
use crate::render::{OverlayDocument, OverlayWriter, Placemark, PlacemarkStyle, ZoneStyle};
use geo_types::Polygon;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Writes an [`OverlayDocument`] as an indented KML 2.2 document.
#[derive(Debug, Clone, Copy)]
pub struct KmlWriter {
    indent: usize,
}

impl Default for KmlWriter {
    fn default() -> Self {
        Self { indent: 1 }
    }
}

impl KmlWriter {
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl OverlayWriter for KmlWriter {
    fn write_overlay<W: Write>(
        &self,
        document: &OverlayDocument,
        out: W,
    ) -> Result<(), HeatmapError> {
        let mut writer = Writer::new_with_indent(out, b' ', self.indent);

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)])),
        )?;
        open(&mut writer, "Document")?;
        text_element(&mut writer, "name", &document.name)?;

        for style in &document.styles {
            write_style(&mut writer, Some(&style.id), style)?;
        }

        open(&mut writer, "Folder")?;
        text_element(&mut writer, "name", &document.folder_name)?;
        for placemark in &document.placemarks {
            write_placemark(&mut writer, placemark)?;
        }
        close(&mut writer, "Folder")?;

        close(&mut writer, "Document")?;
        close(&mut writer, "kml")?;

        writer
            .into_inner()
            .flush()
            .map_err(|e| HeatmapError::Serialization(e.to_string()))
    }
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), HeatmapError> {
    writer
        .write_event(event)
        .map_err(|e| HeatmapError::Serialization(e.to_string()))
}

fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), HeatmapError> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), HeatmapError> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), HeatmapError> {
    open(writer, name)?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn write_style<W: Write>(
    writer: &mut Writer<W>,
    id: Option<&str>,
    style: &ZoneStyle,
) -> Result<(), HeatmapError> {
    let mut start = BytesStart::new("Style");
    if let Some(id) = id {
        start.push_attribute(("id", id));
    }
    emit(writer, Event::Start(start))?;

    open(writer, "LineStyle")?;
    text_element(writer, "width", &style.outline_width.to_string())?;
    close(writer, "LineStyle")?;

    open(writer, "PolyStyle")?;
    text_element(writer, "color", &style.fill.to_kml_hex())?;
    close(writer, "PolyStyle")?;

    close(writer, "Style")
}

fn write_placemark<W: Write>(
    writer: &mut Writer<W>,
    placemark: &Placemark,
) -> Result<(), HeatmapError> {
    open(writer, "Placemark")?;
    text_element(writer, "name", &placemark.name)?;

    match &placemark.style {
        PlacemarkStyle::Shared(id) => text_element(writer, "styleUrl", &format!("#{id}"))?,
        PlacemarkStyle::Inline(style) => write_style(writer, None, style)?,
    }

    write_polygon(writer, &placemark.polygon)?;
    close(writer, "Placemark")
}

fn write_polygon<W: Write>(
    writer: &mut Writer<W>,
    polygon: &Polygon<f64>,
) -> Result<(), HeatmapError> {
    open(writer, "Polygon")?;
    text_element(writer, "extrude", "1")?;
    text_element(writer, "altitudeMode", "relativeToGround")?;
    open(writer, "outerBoundaryIs")?;
    open(writer, "LinearRing")?;

    let coordinates: Vec<String> = polygon
        .exterior()
        .coords()
        .map(|c| format!("{:.6},{:.6},0", c.x, c.y))
        .collect();
    text_element(writer, "coordinates", &coordinates.join(" "))?;

    close(writer, "LinearRing")?;
    close(writer, "outerBoundaryIs")?;
    close(writer, "Polygon")
}
