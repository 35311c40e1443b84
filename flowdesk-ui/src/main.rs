mod app;
mod browser;

mod components {
    pub mod header;
    pub mod layout;
    pub mod widgets;
}

mod pages {
    pub mod dashboard;
    pub mod login;
    pub mod profile;
    pub mod projects;
    pub mod register;
    pub mod tasks;
    pub mod teams;
}

fn main() {
    leptos::mount_to_body(app::App);
}
