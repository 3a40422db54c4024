mod app;
mod audio;
mod camera;
mod canvas;
mod input;
mod menu;
mod score_client;
mod settings;

fn main() {
    app::run();
}
