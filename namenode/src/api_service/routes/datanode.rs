use crate::api_service::controller::datanode;
use rocket::{Route, routes};

pub fn routes() -> Vec<Route> {
    routes![
        datanode::register_datanode,
        datanode::heartbeat,
        datanode::datanodes,
        datanode::datanodes_detailed,
        datanode::placement,
    ]
}
