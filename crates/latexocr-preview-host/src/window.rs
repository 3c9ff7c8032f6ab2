use std::io::{self, BufRead, Write};
use std::thread;

use latexocr_preview::AppMessage;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::WindowBuilder;
use wry::WebViewBuilder;
use wry::http::Request;

use crate::bridge::{command_script, ipc_line, parse_command};

#[derive(Debug)]
enum HostEvent {
    Command(AppMessage),
}

/// Show `html` in a webview and serve controller commands from stdin until
/// `close` arrives or stdin ends
pub fn run(html: &str) -> anyhow::Result<()> {
    let event_loop = EventLoopBuilder::<HostEvent>::with_user_event().build()?;

    let window = WindowBuilder::new()
        .with_title("LaTeX Preview")
        .with_inner_size(LogicalSize::new(640.0, 360.0))
        .build(&event_loop)?;

    let webview = WebViewBuilder::new(&window)
        .with_html(html)
        .with_ipc_handler(|req: Request<String>| {
            if let Some(line) = ipc_line(req.body()) {
                write_line(&line);
            }
        })
        .build()?;

    let proxy = event_loop.create_proxy();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(message) = parse_command(&line)
                && proxy.send_event(HostEvent::Command(message)).is_err()
            {
                return;
            }
        }
        tracing::info!("[HOST] Controller closed stdin");
        let _ = proxy.send_event(HostEvent::Command(AppMessage::Close));
    });

    event_loop.run(move |event, elwt| match event {
        Event::UserEvent(HostEvent::Command(message)) => match message {
            AppMessage::BringToFront => {
                window.set_visible(true);
                window.set_minimized(false);
                window.focus_window();
            }
            AppMessage::Close => elwt.exit(),
            message => {
                if let Some(script) = command_script(&message)
                    && let Err(e) = webview.evaluate_script(&script)
                {
                    tracing::warn!("[HOST] Script failed: {}", e);
                }
            }
        },
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => window.set_visible(false),
        Event::AboutToWait => elwt.set_control_flow(ControlFlow::Wait),
        _ => {}
    })?;

    Ok(())
}

fn write_line(line: &str) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|()| out.flush()).is_err() {
        tracing::warn!("[HOST] Controller stopped reading");
    }
}
