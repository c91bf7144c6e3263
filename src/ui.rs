//! Desktop front-end: port selection, connect/disconnect, and status.
//!
//! The window owns no serial or gamepad state. It spawns a
//! [`BridgeHandle`] on connect and afterwards only drains the
//! [`BridgeEvent`] channel each frame; the worker thread never touches
//! widget state directly.

use eframe::egui::{self, Color32, RichText};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::bridge::{BridgeEvent, BridgeHandle, BridgeSettings};
use crate::serial;

const INDICATOR_RADIUS: f32 = 9.0;

/// Severity coloring for the status line and indicator dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Idle,
    Connected,
    Failed,
}

impl StatusKind {
    fn color(self) -> Color32 {
        match self {
            StatusKind::Idle => Color32::GRAY,
            StatusKind::Connected => Color32::from_rgb(0x2e, 0xcc, 0x71),
            StatusKind::Failed => Color32::from_rgb(0xe7, 0x4c, 0x3c),
        }
    }
}

pub struct WheelbridgeUI {
    /// Ports offered in the dropdown, refreshed on demand
    ports: Vec<String>,
    selected_port: Option<String>,

    /// Running connection, if any
    bridge: Option<BridgeHandle>,

    /// Worker → UI status channel; the sender side is cloned into every
    /// spawned bridge
    events_tx: mpsc::Sender<BridgeEvent>,
    events_rx: mpsc::Receiver<BridgeEvent>,

    status_text: String,
    status_kind: StatusKind,
}

impl WheelbridgeUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        events_tx: mpsc::Sender<BridgeEvent>,
        events_rx: mpsc::Receiver<BridgeEvent>,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let ports = serial::list_ports();
        let selected_port = ports.first().cloned();

        WheelbridgeUI {
            ports,
            selected_port,
            bridge: None,
            events_tx,
            events_rx,
            status_text: "Waiting for port selection...".to_string(),
            status_kind: StatusKind::Idle,
        }
    }

    /// Applies all pending worker status events to the widget state.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                BridgeEvent::Connected { port } => {
                    self.status_text = format!("Connected on {}", port);
                    self.status_kind = StatusKind::Connected;
                }
                BridgeEvent::Error { message, at } => {
                    error!("Bridge error: {}", message);
                    self.status_text = format!("{} ({})", message, at.format("%H:%M:%S"));
                    self.status_kind = StatusKind::Failed;
                    // Worker already exited; join it and free the port
                    if let Some(bridge) = self.bridge.take() {
                        bridge.shutdown();
                    }
                }
                BridgeEvent::Disconnected { frames_discarded } => {
                    self.status_text = if frames_discarded > 0 {
                        format!("Disconnected ({} frames discarded)", frames_discarded)
                    } else {
                        "Disconnected".to_string()
                    };
                    self.status_kind = StatusKind::Idle;
                }
            }
        }
    }

    fn connect(&mut self) {
        let Some(port) = self.selected_port.clone() else {
            self.status_text = "Select a serial port before connecting".to_string();
            self.status_kind = StatusKind::Failed;
            return;
        };

        match BridgeHandle::spawn(BridgeSettings::for_port(port), self.events_tx.clone()) {
            Ok(handle) => {
                self.bridge = Some(handle);
            }
            Err(e) => {
                error!("Connection attempt failed: {}", e);
                self.status_text = format!("{}", e);
                self.status_kind = StatusKind::Failed;
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(bridge) = self.bridge.take() {
            info!("User requested disconnect from {}", bridge.port());
            bridge.shutdown();
        }
    }
}

impl eframe::App for WheelbridgeUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        // A bridge whose worker died on its own is no longer connected;
        // reclaim it so the connect button comes back
        if self.bridge.as_ref().is_some_and(BridgeHandle::is_finished) {
            if let Some(bridge) = self.bridge.take() {
                bridge.shutdown();
            }
        }

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("port_select")
                    .selected_text(self.selected_port.as_deref().unwrap_or("no ports found"))
                    .show_ui(ui, |ui| {
                        for port in &self.ports {
                            ui.selectable_value(
                                &mut self.selected_port,
                                Some(port.clone()),
                                port,
                            );
                        }
                    });

                if ui.button("Rescan").clicked() {
                    self.ports = serial::list_ports();
                    if self.selected_port.is_none() {
                        self.selected_port = self.ports.first().cloned();
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(INDICATOR_RADIUS * 2.0, INDICATOR_RADIUS * 2.0),
                        egui::Sense::hover(),
                    );
                    ui.painter().circle_filled(
                        rect.center(),
                        INDICATOR_RADIUS,
                        self.status_kind.color(),
                    );
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.heading("Wheel Controller Bridge");
                ui.add_space(8.0);
                ui.label(RichText::new(&self.status_text).color(self.status_kind.color()));
                ui.add_space(12.0);

                if self.bridge.is_some() {
                    if ui.button("Disconnect").clicked() {
                        self.disconnect();
                    }
                } else if ui.button("Connect").clicked() {
                    self.connect();
                }
            });
        });

        // Status events arrive from the worker thread at any time
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
