use spectra_view::gui::SpectraViewApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!("Starting Spectra View v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Spectra View"),
        ..Default::default()
    };

    eframe::run_native(
        "Spectra View",
        options,
        Box::new(|cc| Ok(Box::new(SpectraViewApp::new(cc)))),
    )
}
