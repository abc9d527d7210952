use crate::middleware::error_handling::{json_error_handler, path_error_handler};
use actix_web::web;

pub mod discussion;
pub mod queues;
pub mod wsroute;

/// Registers every `/api` endpoint on the given scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(path_error_handler))
        // the web client posts JSON without a content type
        .app_data(
            web::JsonConfig::default()
                .content_type_required(false)
                .error_handler(json_error_handler),
        )
        .service(queues::add_point)
        .service(queues::add_clarifier)
        .service(queues::delete_point)
        .service(queues::delete_clarifier)
        .service(queues::change_topic)
        .service(queues::new_child_queue)
        .service(queues::get_queue_path)
        .service(queues::get_queue)
        .service(discussion::get_discussion)
        .service(discussion::get_me)
        .service(wsroute::ws_handler);
}
