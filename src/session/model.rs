use crate::{
    area::{io, Area, AreaCollection, AreaLabel},
    geometry::{BoundingBox, LatLng},
};
use geojson::Geometry;
use serde::{Deserialize, Serialize};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};
use tracing::{debug, info, warn};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        MapView {
            lat: 45.523840041350965,
            lon: 9.21977690041348,
            zoom: 17,
        }
    }
}

/// A drawing waiting for the user to pick its label.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PendingDrawing {
    pub area: Area,
    pub view: MapView,
}

/// Everything the map page needs to render itself. Each interaction consumes the
/// current state and produces the next one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionState {
    pub view: MapView,
    pub areas: AreaCollection,
    /// Keep every area in sight whenever the collection changes.
    pub fit_bounds: bool,
    pub bounds: Option<BoundingBox>,
    pub pending: Option<PendingDrawing>,
    pub last_clicked: Option<LatLng>,
    #[serde(skip)]
    pub last_upload: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    Draw { geometry: Geometry, view: MapView },
    Label { label: Option<AreaLabel> },
    Import { content: String },
    ClearUpload,
    SetFitBounds { enabled: bool },
    Click { lat: f64, lng: f64 },
    DeleteSelected,
    DeleteByLabel { name: String },
    DeleteAll { view: MapView },
}

/// Next state plus a message to show the user, if any.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub notice: Option<String>,
}

impl SessionState {
    pub fn new(view: MapView) -> Self {
        SessionState {
            view,
            areas: AreaCollection::new(),
            fit_bounds: false,
            bounds: None,
            pending: None,
            last_clicked: None,
            last_upload: None,
        }
    }

    pub fn apply(mut self, interaction: Interaction) -> Transition {
        let notice = match interaction {
            Interaction::Draw { geometry, view } => self.draw(geometry, view),
            Interaction::Label { label } => self.label(label.unwrap_or(AreaLabel::Unknown)),
            Interaction::Import { content } => self.import(&content),
            Interaction::ClearUpload => {
                self.last_upload = None;
                None
            }
            Interaction::SetFitBounds { enabled } => {
                self.fit_bounds = enabled;
                self.bounds = if enabled {
                    self.areas.bounds().ok()
                } else {
                    None
                };
                None
            }
            Interaction::Click { lat, lng } => {
                self.last_clicked = Some(LatLng::new(lat, lng));
                None
            }
            Interaction::DeleteSelected => self.delete_selected(),
            Interaction::DeleteByLabel { name } => self.delete_by_label(&name),
            Interaction::DeleteAll { view } => {
                self.areas.clear();
                self.bounds = None;
                self.pending = None;
                self.last_clicked = None;
                self.view = view;
                None
            }
        };
        if let Some(notice) = &notice {
            warn!(notice = notice.as_str(), "Interaction rejected");
        }
        Transition {
            state: self,
            notice,
        }
    }

    fn draw(&mut self, geometry: Geometry, view: MapView) -> Option<String> {
        if self.areas.contains_geometry(&geometry) {
            debug!("Drawing already stored, ignoring");
            return None;
        }
        match Area::new(geometry) {
            Ok(area) => {
                self.pending = Some(PendingDrawing { area, view });
                None
            }
            Err(e) => Some(format!("Invalid drawing: {e}")),
        }
    }

    fn label(&mut self, label: AreaLabel) -> Option<String> {
        let Some(PendingDrawing { mut area, view }) = self.pending.take() else {
            return Some("There is no drawing to label".into());
        };
        area.set_label(label);
        self.areas.push(area);
        self.view = view;
        self.bounds = if self.fit_bounds {
            self.areas.bounds().ok()
        } else {
            None
        };
        info!(label = %label, areas = self.areas.len(), "Area added");
        None
    }

    fn import(&mut self, content: &str) -> Option<String> {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        let hash = hasher.finish();
        if self.last_upload == Some(hash) {
            debug!("Same file uploaded again, ignoring");
            return None;
        }
        self.pending = None;
        self.last_clicked = None;
        match io::import(content) {
            Ok(areas) => {
                info!(areas = areas.len(), "Imported areas");
                self.last_upload = Some(hash);
                self.areas = areas;
                self.bounds = self.areas.bounds().ok();
                None
            }
            Err(e) => {
                self.areas.clear();
                self.bounds = None;
                Some(format!("Invalid GeoJSON file: {e}"))
            }
        }
    }

    fn delete_selected(&mut self) -> Option<String> {
        let Some(point) = self.last_clicked else {
            return Some("No area selected".into());
        };
        if self.areas.remove_containing(&point).is_none() {
            return Some("There is no area at the selected point".into());
        }
        self.last_clicked = None;
        self.refresh_bounds_after_delete();
        None
    }

    fn delete_by_label(&mut self, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        if self.areas.remove_by_name(&name) == 0 {
            return Some(format!("There are no areas named {name}"));
        }
        self.refresh_bounds_after_delete();
        None
    }

    fn refresh_bounds_after_delete(&mut self) {
        if self.fit_bounds || self.bounds.is_some() {
            self.bounds = self.areas.bounds().ok();
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::new(MapView::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{mock_feature_collection, mock_square_geometry};

    fn view(zoom: u8) -> MapView {
        MapView {
            lat: 45.0,
            lon: 9.0,
            zoom,
        }
    }

    fn draw_and_label(state: SessionState, lon: f64, label: AreaLabel) -> SessionState {
        let state = state
            .apply(Interaction::Draw {
                geometry: mock_square_geometry(lon, 45.0, 1.0),
                view: view(15),
            })
            .state;
        state
            .apply(Interaction::Label { label: Some(label) })
            .state
    }

    #[test]
    fn draw_then_label() {
        let state = SessionState::default();
        let res = state.apply(Interaction::Draw {
            geometry: mock_square_geometry(9.0, 45.0, 1.0),
            view: view(15),
        });
        assert_eq!(res.notice, None);
        assert!(res.state.pending.is_some());
        assert!(res.state.areas.is_empty());
        let res = res.state.apply(Interaction::Label { label: None });
        assert_eq!(res.notice, None);
        assert!(res.state.pending.is_none());
        assert_eq!(res.state.view, view(15));
        let area = res.state.areas.iter().next().unwrap();
        assert_eq!(area.name(), Some("unknown area"));
        assert_eq!(res.state.bounds, None);
    }

    #[test]
    fn draw_existing_geometry_is_ignored() {
        let state = draw_and_label(SessionState::default(), 9.0, AreaLabel::Road);
        let res = state.apply(Interaction::Draw {
            geometry: mock_square_geometry(9.0, 45.0, 1.0),
            view: view(15),
        });
        assert!(res.state.pending.is_none());
        assert_eq!(res.state.areas.len(), 1);
    }

    #[test]
    fn draw_point_is_rejected() {
        let res = SessionState::default().apply(Interaction::Draw {
            geometry: Geometry::new(geojson::Value::Point(vec![9.0, 45.0])),
            view: view(15),
        });
        assert!(res.notice.is_some());
        assert!(res.state.pending.is_none());
    }

    #[test]
    fn label_without_drawing() {
        let res = SessionState::default().apply(Interaction::Label { label: None });
        assert!(res.notice.is_some());
        assert!(res.state.areas.is_empty());
    }

    #[test]
    fn fit_bounds_follows_areas() {
        let state = SessionState::default()
            .apply(Interaction::SetFitBounds { enabled: true })
            .state;
        assert_eq!(state.bounds, None);
        let state = draw_and_label(state, 9.0, AreaLabel::Water);
        let state = draw_and_label(state, 11.0, AreaLabel::Water);
        assert_eq!(
            state.bounds,
            Some(BoundingBox::new(9.0, 45.0, 12.0, 46.0))
        );
        let state = state
            .apply(Interaction::SetFitBounds { enabled: false })
            .state;
        assert_eq!(state.bounds, None);
    }

    #[test]
    fn import_replaces_areas() {
        let state = draw_and_label(SessionState::default(), 0.0, AreaLabel::Road);
        let res = state.apply(Interaction::Import {
            content: mock_feature_collection(&["building", "water"]),
        });
        assert_eq!(res.notice, None);
        assert_eq!(res.state.areas.len(), 2);
        assert!(res.state.bounds.is_some());
        assert!(res.state.last_upload.is_some());
    }

    #[test]
    fn import_same_content_twice_is_noop() {
        let content = mock_feature_collection(&["building"]);
        let state = SessionState::default()
            .apply(Interaction::Import {
                content: content.clone(),
            })
            .state;
        let state = draw_and_label(state, 20.0, AreaLabel::Road);
        let state = state.apply(Interaction::Import { content }).state;
        assert_eq!(state.areas.len(), 2);
    }

    #[test]
    fn import_invalid_resets_areas() {
        let state = draw_and_label(SessionState::default(), 0.0, AreaLabel::Road);
        let res = state.apply(Interaction::Import {
            content: r#"{"type": "FeatureCollection", "features": []}"#.into(),
        });
        assert!(res.notice.is_some());
        assert!(res.state.areas.is_empty());
        assert_eq!(res.state.bounds, None);
        let res = res.state.apply(Interaction::Import {
            content: "{".into(),
        });
        assert!(res.notice.is_some());
        assert!(res.state.areas.is_empty());
    }

    #[test]
    fn delete_selected() {
        let state = draw_and_label(SessionState::default(), 0.0, AreaLabel::Road);
        let state = draw_and_label(state, 5.0, AreaLabel::Water);
        let res = state.clone().apply(Interaction::DeleteSelected);
        assert!(res.notice.is_some());
        let state = state
            .apply(Interaction::Click {
                lat: 45.5,
                lng: 5.5,
            })
            .state;
        let res = state.apply(Interaction::DeleteSelected);
        assert_eq!(res.notice, None);
        assert_eq!(res.state.areas.len(), 1);
        assert_eq!(res.state.last_clicked, None);
        assert_eq!(res.state.areas.iter().next().unwrap().name(), Some("road"));
    }

    #[test]
    fn delete_by_label() {
        let state = draw_and_label(SessionState::default(), 0.0, AreaLabel::Road);
        let state = draw_and_label(state, 5.0, AreaLabel::Water);
        let state = draw_and_label(state, 10.0, AreaLabel::Road);
        let res = state.apply(Interaction::DeleteByLabel {
            name: "Road".into(),
        });
        assert_eq!(res.notice, None);
        assert_eq!(res.state.areas.len(), 1);
        let res = res.state.apply(Interaction::DeleteByLabel {
            name: "road".into(),
        });
        assert!(res.notice.is_some());
    }

    #[test]
    fn delete_by_label_ignores_case_of_imported_names() {
        let state = SessionState::default()
            .apply(Interaction::Import {
                content: mock_feature_collection(&["Edificio", "water"]),
            })
            .state;
        let res = state.apply(Interaction::DeleteByLabel {
            name: "EDIFICIO".into(),
        });
        assert_eq!(res.notice, None);
        assert_eq!(res.state.areas.len(), 1);
        assert_eq!(res.state.areas.iter().next().unwrap().name(), Some("water"));
    }

    #[test]
    fn delete_all() {
        let state = SessionState::default()
            .apply(Interaction::SetFitBounds { enabled: true })
            .state;
        let state = draw_and_label(state, 0.0, AreaLabel::Road);
        let state = state.apply(Interaction::Click { lat: 45.5, lng: 0.5 }).state;
        let res = state.apply(Interaction::DeleteAll { view: view(12) });
        assert!(res.state.areas.is_empty());
        assert_eq!(res.state.bounds, None);
        assert_eq!(res.state.last_clicked, None);
        assert_eq!(res.state.view, view(12));
        assert!(res.state.fit_bounds);
    }

    #[test]
    fn interaction_json() {
        let interaction: Interaction = serde_json::from_str(
            r#"{"type": "label", "label": "agricultural_field"}"#,
        )
        .unwrap();
        assert_eq!(
            interaction,
            Interaction::Label {
                label: Some(AreaLabel::AgriculturalField)
            }
        );
        let interaction: Interaction =
            serde_json::from_str(r#"{"type": "delete_selected"}"#).unwrap();
        assert_eq!(interaction, Interaction::DeleteSelected);
    }
}
