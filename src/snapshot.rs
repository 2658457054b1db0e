// View DTOs the render layer pulls. Every pull allocates fresh collections;
// each body's fields come from one consistent engine snapshot.

use serde::Serialize;

use crate::body::DynamicBody;
use crate::simulation::Scenery;

/// Point-in-time view of one dynamic body.
#[derive(Debug, Clone, Serialize)]
pub struct BodyView {
    pub id: u64,
    pub asset: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
}

impl From<&DynamicBody> for BodyView {
    fn from(body: &DynamicBody) -> Self {
        let state = body.engine().snapshot();
        Self {
            id: body.id(),
            asset: body.asset().to_string(),
            size: state.size,
            x: state.x,
            y: state.y,
            angle: state.angle,
            vx: state.vx,
            vy: state.vy,
            ax: state.ax,
            ay: state.ay,
        }
    }
}

/// View of one static or decorative body; these never move.
#[derive(Debug, Clone, Serialize)]
pub struct SceneryView {
    pub id: u64,
    pub asset: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl From<&Scenery> for SceneryView {
    fn from(scenery: &Scenery) -> Self {
        Self {
            id: scenery.id,
            asset: scenery.asset.clone(),
            size: scenery.size,
            x: scenery.x,
            y: scenery.y,
            angle: scenery.angle,
        }
    }
}
