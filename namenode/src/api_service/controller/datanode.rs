use std::sync::Arc;

use rocket::{State, get, post, serde::json::Json};
use serde::{Deserialize, Serialize};
use utilities::logger::{info, instrument, tracing};

use crate::{
    api_service::{SharedRecorder, SharedSelectionPolicy, middleware::auth::AuthenticatedUser},
    datanode::selection_policy::selection_policy::DatanodeSelectionPolicy,
    ledger::recorder::Recorder,
    error::NamenodeError,
    namenode_state::{
        NamenodeState,
        datanode_details::{DatanodeAnnouncement, HeartbeatReport},
        membership::HeartbeatOutcome,
        state_snapshot::DatanodeReport,
    },
};

#[derive(Debug, Deserialize, Serialize)]
pub struct DatanodeRegistered {
    pub url: String,
    pub newly_registered: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HeartbeatAck {
    pub status: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DatanodeList {
    pub datanodes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailedDatanodeList {
    pub datanodes: Vec<DatanodeReport>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PlacementResponse {
    pub placements: Vec<String>,
}

#[post("/register_datanode", data = "<body>")]
#[instrument(name = "api_register_datanode", skip_all, fields(url = %body.url))]
pub async fn register_datanode(
    body: Json<DatanodeAnnouncement>,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Json<DatanodeRegistered> {
    let announcement = body.into_inner();
    ledger
        .register_datanode(&announcement.url, &announcement.node_id, announcement.capacity)
        .await;
    let url = announcement.url.clone();
    let newly_registered = state.register_datanode(announcement).await;
    info!(newly_registered, "Datanode registered");
    Json(DatanodeRegistered {
        url,
        newly_registered,
    })
}

#[post("/heartbeat", data = "<body>")]
#[instrument(name = "api_heartbeat", skip_all, fields(url = %body.url))]
pub async fn heartbeat(
    body: Json<HeartbeatReport>,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Json<HeartbeatAck> {
    let report = body.into_inner();
    let (url, node_id, capacity) = (report.url.clone(), report.node_id.clone(), report.capacity);
    let status = match state.heartbeat(report).await {
        HeartbeatOutcome::Refreshed => "ok",
        HeartbeatOutcome::Resurrected => {
            info!("Datanode is active again");
            ledger.datanode_resurrected(&url).await;
            "resurrected"
        }
        HeartbeatOutcome::SelfRegistered => {
            info!("Unknown datanode registered through heartbeat");
            ledger.register_datanode(&url, &node_id, capacity).await;
            "registered"
        }
    };
    Json(HeartbeatAck {
        status: status.to_string(),
    })
}

#[get("/datanodes")]
pub async fn datanodes(_user: AuthenticatedUser, state: &State<Arc<NamenodeState>>) -> Json<DatanodeList> {
    Json(DatanodeList {
        datanodes: state.active_datanodes().await,
    })
}

#[get("/datanodes/detailed")]
pub async fn datanodes_detailed(
    _user: AuthenticatedUser,
    state: &State<Arc<NamenodeState>>,
) -> Json<DetailedDatanodeList> {
    Json(DetailedDatanodeList {
        datanodes: state.datanode_reports().await,
    })
}

#[get("/placement?<blocks>")]
pub async fn placement(
    _user: AuthenticatedUser,
    blocks: usize,
    policy: &State<SharedSelectionPolicy>,
) -> Result<Json<PlacementResponse>, NamenodeError> {
    Ok(Json(PlacementResponse {
        placements: policy.get_datanodes_to_store(blocks).await?,
    }))
}
