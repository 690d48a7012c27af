use crate::api_service::controller::namespace;
use rocket::{Route, routes};

pub fn routes() -> Vec<Route> {
    routes![
        namespace::register_file,
        namespace::get_file,
        namespace::remove_file,
        namespace::mkdir,
        namespace::rmdir,
        namespace::list,
        namespace::file_health,
    ]
}
