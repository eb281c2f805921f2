use crate::error::HeatmapError;
use crate::render::{OverlayDocument, OverlayWriter, Placemark, PlacemarkStyle, ZoneStyle};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde_json::json;
use std::io::Write;

/// Writes an [`OverlayDocument`] as a GeoJSON FeatureCollection.
///
/// Fill colors follow the simplestyle property names so the output renders
/// directly in common viewers. Shared styles are kept in a top-level
/// `styles` member.
#[derive(Debug, Clone, Copy)]
pub struct GeoJsonWriter {
    pretty: bool,
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl GeoJsonWriter {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn to_feature_collection(&self, document: &OverlayDocument) -> FeatureCollection {
        let features = document
            .placemarks
            .iter()
            .map(|p| placemark_to_feature(document, p))
            .collect();

        let mut members = JsonObject::new();
        members.insert("name".to_string(), JsonValue::from(document.name.clone()));
        members.insert(
            "folder".to_string(),
            JsonValue::from(document.folder_name.clone()),
        );
        members.insert(
            "styles".to_string(),
            JsonValue::Array(document.styles.iter().map(style_to_json).collect()),
        );

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(members),
        }
    }
}

impl OverlayWriter for GeoJsonWriter {
    fn write_overlay<W: Write>(
        &self,
        document: &OverlayDocument,
        mut out: W,
    ) -> Result<(), HeatmapError> {
        let collection = self.to_feature_collection(document);
        if self.pretty {
            serde_json::to_writer_pretty(&mut out, &collection)?;
        } else {
            serde_json::to_writer(&mut out, &collection)?;
        }
        out.write_all(b"\n")
            .and_then(|()| out.flush())
            .map_err(|e| HeatmapError::Serialization(e.to_string()))
    }
}

fn style_to_json(style: &ZoneStyle) -> JsonValue {
    json!({
        "id": style.id,
        "fill": style.fill.to_css_hex(),
        "fill-opacity": style.fill.opacity(),
        "stroke-width": style.outline_width,
    })
}

fn placemark_to_feature(document: &OverlayDocument, placemark: &Placemark) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(placemark.name.clone()));

    let style = match &placemark.style {
        PlacemarkStyle::Shared(id) => {
            properties.insert("styleUrl".to_string(), JsonValue::from(format!("#{id}")));
            document.styles.iter().find(|s| &s.id == id)
        }
        PlacemarkStyle::Inline(style) => Some(style),
    };
    if let Some(style) = style {
        properties.insert("fill".to_string(), JsonValue::from(style.fill.to_css_hex()));
        properties.insert(
            "fill-opacity".to_string(),
            JsonValue::from(style.fill.opacity()),
        );
        properties.insert(
            "stroke-width".to_string(),
            JsonValue::from(style.outline_width),
        );
    }
    if let Some(zone) = placemark.zone {
        properties.insert("zone".to_string(), JsonValue::from(zone.style_id()));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::from(&placemark.polygon)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLng;
    use crate::core::lattice::{BoundingRectangle, StepAngle};
    use crate::io::store::{ResultStore, TravelResult};
    use crate::render::RenderConfig;
    use geojson::GeoJson;
    use std::time::Duration;

    fn document() -> Result<OverlayDocument, HeatmapError> {
        let area = BoundingRectangle::new(&LatLng::new(10.0, 20.0), &LatLng::new(11.0, 21.0));
        let mut store = ResultStore::new(&area, Some(StepAngle::new(0.5, 0.5)));
        store.extend([
            TravelResult {
                coordinate: LatLng::new(10.25, 20.25),
                duration_seconds: 120,
                bounds: None,
            },
            TravelResult {
                coordinate: LatLng::new(10.75, 20.75),
                duration_seconds: 5000,
                bounds: None,
            },
        ]);
        OverlayDocument::render(&store, &RenderConfig::new(Duration::from_secs(900), 3)?)
    }

    #[test]
    fn test_geojson_output_parses_back() -> Result<(), HeatmapError> {
        let mut buf = Vec::new();
        GeoJsonWriter::default().write_overlay(&document()?, &mut buf)?;
        let text = String::from_utf8(buf).map_err(|e| HeatmapError::Serialization(e.to_string()))?;

        let parsed: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| HeatmapError::Serialization(e.to_string()))?;
        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("Expected FeatureCollection");
        };

        assert_eq!(fc.features.len(), 3);
        let names: Vec<String> = fc
            .features
            .iter()
            .filter_map(|f| f.property("name").and_then(|v| v.as_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["Sampled area", "2 min", "83 min"]);

        assert_eq!(
            fc.features[1].property("zone").and_then(|v| v.as_str()),
            Some("zone-0")
        );
        assert_eq!(
            fc.features[2].property("styleUrl").and_then(|v| v.as_str()),
            Some("#zone-denied")
        );
        assert!(fc.features[0].property("zone").is_none());
        Ok(())
    }

    #[test]
    fn test_styles_member() -> Result<(), HeatmapError> {
        let fc = GeoJsonWriter::default().to_feature_collection(&document()?);
        let members = fc.foreign_members.expect("foreign members");
        let styles = members["styles"].as_array().expect("styles array");
        assert_eq!(styles.len(), 4);
        assert_eq!(styles[1]["id"], "zone-0");
        assert_eq!(styles[1]["fill"], "#00ff00");
        Ok(())
    }
}
