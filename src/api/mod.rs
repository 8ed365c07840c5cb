use rocket::Route;

pub mod auth;
pub mod history;
mod preference;
mod recommendation;
mod user;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(user::routes());
    routes.extend(preference::routes());
    routes.extend(history::routes());
    routes.extend(recommendation::routes());
    routes
}
