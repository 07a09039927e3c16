mod app;
mod market;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the market data service.
    #[arg(long, default_value = "http://localhost:8000")]
    api_url: String,

    /// Skip the network and start from the embedded snapshot.
    #[arg(long)]
    offline: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "constellation-terminal",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ConstellationApp::new(
                cc,
                args.api_url.clone(),
                args.offline,
            )))
        }),
    )
}
