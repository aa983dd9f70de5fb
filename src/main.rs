use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoopProxy;

#[cfg(feature = "gpio")]
use rudder_gauge::GpioEncoder;
#[cfg(not(feature = "gpio"))]
use rudder_gauge::SimulatedEncoder;
use rudder_gauge::{
    GaugeConfig, GaugeError, GaugeRenderer, InputLoop, PanelEvent, PanelWindow, RenderLoop,
    SharedPosition, StopSignal, PANEL_SIZE,
};

type LoopHandle = JoinHandle<Result<u64, GaugeError>>;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "rudder gauge stopped");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GaugeError> {
    let config = GaugeConfig::default();
    config.validate()?;
    info!(
        steps = config.steps,
        min_degree = config.min_degree,
        max_degree = config.max_degree,
        poll_ms = config.poll_interval_ms,
        render_ms = config.render_interval_ms,
        "starting rudder gauge"
    );

    let position = Arc::new(SharedPosition::new(config.steps));
    let stop = StopSignal::new();
    let panel = PanelWindow::new(&config)?;

    #[cfg(feature = "gpio")]
    let (pins, keyboard) = (GpioEncoder::open(&config)?, None);
    #[cfg(not(feature = "gpio"))]
    let (pins, keyboard) = {
        let encoder = SimulatedEncoder::new();
        info!("no GPIO: arrow keys turn the encoder, space presses the button");
        (encoder.clone(), Some(encoder))
    };

    let mut input = InputLoop::new(pins, Arc::clone(&position), config.poll_interval())?;
    let input_handle = spawn_loop("input", panel.proxy(), stop.clone(), move |stop| {
        input.run(&stop)
    })?;

    let renderer = GaugeRenderer::new(PANEL_SIZE, PANEL_SIZE, &config);
    let render = RenderLoop::new(renderer, &config, Arc::clone(&position));
    let mut display = panel.display();
    let render_handle = spawn_loop("render", panel.proxy(), stop.clone(), move |stop| {
        render.run(&mut display, &stop)
    })?;

    let panel_result = panel.run(keyboard, stop.clone());
    stop.stop();
    let input_result = join_loop("input", input_handle);
    let render_result = join_loop("render", render_handle);

    input_result?;
    render_result?;
    panel_result
}

/// Runs a loop on its own thread. When the loop returns, for any reason, the
/// other loop and the window are told to shut down.
fn spawn_loop<F>(
    name: &'static str,
    proxy: EventLoopProxy<PanelEvent>,
    stop: StopSignal,
    body: F,
) -> Result<LoopHandle, GaugeError>
where
    F: FnOnce(StopSignal) -> Result<u64, GaugeError> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{name}-loop"))
        .spawn(move || {
            let result = body(stop.clone());
            if let Err(err) = &result {
                error!(%err, "{name} loop failed");
            }
            stop.stop();
            let _ = proxy.send_event(PanelEvent::Shutdown);
            result
        })
        .map_err(|source| GaugeError::Spawn { name, source })
}

fn join_loop(name: &'static str, handle: LoopHandle) -> Result<(), GaugeError> {
    let iterations = handle
        .join()
        .map_err(|_| GaugeError::ThreadPanicked(name))??;
    info!(iterations, "{name} loop finished");
    Ok(())
}
