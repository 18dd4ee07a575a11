//! Tray icon for pomoclock.
//!
//! This module provides:
//! - A progress bitmap with the remaining minutes (`icon.rs`)
//! - The tray menu model (`menu.rs`)
//! - Menu actions and tray update messages (`event.rs`)
//! - [`TrayIconManager`], which owns the native tray icon on macOS
//!
//! # Architecture
//!
//! The rendering and menu logic is platform-independent and fully testable.
//! Only `TrayIconManager` touches `tray-icon`, and only on macOS; elsewhere
//! it keeps the rendered state without showing anything.
//!
//! Snapshots arrive through a crossbeam channel from the
//! [`TrayView`](crate::view::TrayView):
//!
//! ```ignore
//! use crossbeam_channel::unbounded;
//! use pomoclock::menubar::TrayIconManager;
//! use pomoclock::view::TrayView;
//!
//! let (tx, rx) = unbounded();
//! let mut manager = TrayIconManager::new(rx);
//! manager.initialize()?;
//!
//! let mut view = TrayView::new(tx);
//! view.render(&snapshot)?;
//! manager.process_pending_updates();
//! ```

pub mod event;
pub mod icon;
pub mod menu;

pub use event::{EventHandler, MenuAction, MenuItemId, TrayUpdate};
pub use icon::{render_icon, tooltip, IconManager, TrayBitmap, ICON_HEIGHT, ICON_WIDTH};
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig};

use crossbeam_channel::Receiver;

use crate::types::TimerSnapshot;

// ============================================================================
// TrayIconManager
// ============================================================================

/// Manages the tray icon.
///
/// Coordinates the [`IconManager`] (bitmap), the [`MenuBuilder`] (menu
/// model) and the [`EventHandler`] (menu clicks). On macOS it also owns the
/// `tray-icon` instance; on other platforms it runs in a no-op mode.
pub struct TrayIconManager {
    icon_manager: IconManager,
    menu_builder: MenuBuilder,
    event_handler: EventHandler,
    /// Last snapshot received
    current: Option<TimerSnapshot>,
    /// Last bitmap rendered
    bitmap: Option<TrayBitmap>,
    /// Last menu model applied
    menu: Option<MenuConfig>,
    update_rx: Receiver<TrayUpdate>,
    initialized: bool,
    #[cfg(target_os = "macos")]
    tray_icon: Option<tray_icon::TrayIcon>,
}

impl TrayIconManager {
    /// Creates a manager reading updates from `update_rx`.
    ///
    /// On macOS the native icon is created by [`initialize`](Self::initialize),
    /// which must run on the main thread.
    pub fn new(update_rx: Receiver<TrayUpdate>) -> Self {
        Self {
            icon_manager: IconManager::new(),
            menu_builder: MenuBuilder::new(),
            event_handler: EventHandler::new(),
            current: None,
            bitmap: None,
            menu: None,
            update_rx,
            initialized: false,
            #[cfg(target_os = "macos")]
            tray_icon: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the last snapshot received.
    pub fn current_snapshot(&self) -> Option<&TimerSnapshot> {
        self.current.as_ref()
    }

    /// Returns the last bitmap rendered.
    pub fn current_bitmap(&self) -> Option<&TrayBitmap> {
        self.bitmap.as_ref()
    }

    /// Returns the last menu model applied.
    pub fn current_menu(&self) -> Option<&MenuConfig> {
        self.menu.as_ref()
    }

    /// Returns the tooltip for the last snapshot.
    pub fn current_tooltip(&self) -> Option<String> {
        self.current.as_ref().map(tooltip)
    }

    /// Processes one pending update.
    ///
    /// Returns `true` if an update was processed, `false` if the channel was empty.
    pub fn process_pending_update(&mut self) -> bool {
        match self.update_rx.try_recv() {
            Ok(update) => {
                self.handle_update(update);
                true
            }
            Err(crossbeam_channel::TryRecvError::Empty) => false,
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                tracing::warn!("Tray update channel disconnected");
                false
            }
        }
    }

    /// Processes every pending update. Returns how many were handled.
    pub fn process_pending_updates(&mut self) -> usize {
        let mut handled = 0;
        while self.process_pending_update() {
            handled += 1;
        }
        handled
    }

    fn handle_update(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::Refresh(snapshot) => self.apply(snapshot),
            TrayUpdate::Shutdown => {
                tracing::info!("Shutting down tray icon");
                self.shutdown();
            }
        }
    }

    fn apply(&mut self, snapshot: TimerSnapshot) {
        if self.icon_manager.needs_redraw(&snapshot) {
            let bitmap = self.icon_manager.render(&snapshot);
            self.set_native_icon(&bitmap);
            self.bitmap = Some(bitmap);
        }
        self.set_native_texts(&snapshot);

        let menu = self.menu_builder.build(&snapshot);
        if self.menu.as_ref() != Some(&menu) {
            tracing::debug!("Rebuilding tray menu");
            self.set_native_menu(&menu);
            self.menu = Some(menu);
        }

        self.current = Some(snapshot);
    }

    /// Returns the action of a pending menu click, if any.
    pub fn poll_menu_action(&self) -> Option<MenuAction> {
        #[cfg(target_os = "macos")]
        {
            let event = tray_icon::menu::MenuEvent::receiver().try_recv().ok()?;
            self.event_handler
                .handle_click(MenuItemId::parse(event.id.0.as_str()))
        }
        #[cfg(not(target_os = "macos"))]
        {
            let _ = &self.event_handler;
            None
        }
    }

    /// Removes the tray icon.
    pub fn shutdown(&mut self) {
        self.initialized = false;
        #[cfg(target_os = "macos")]
        {
            self.tray_icon = None;
        }
    }

    /// Creates the native tray icon (macOS only).
    ///
    /// # Errors
    ///
    /// Returns an error if the tray icon cannot be created.
    #[cfg(target_os = "macos")]
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        use anyhow::Context;
        use tray_icon::TrayIconBuilder;

        let palette = crate::view::Palette::LIGHT;
        let bitmap = self
            .bitmap
            .clone()
            .unwrap_or_else(|| render_icon(0, 0, palette.tray_track, palette.tray_ink));
        let icon = tray_icon::Icon::from_rgba(bitmap.into_rgba(), ICON_WIDTH, ICON_HEIGHT)
            .context("Failed to build tray bitmap")?;

        let mut builder = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(self.current_tooltip().unwrap_or_else(|| "Pomodoro".to_string()));
        if let Some(ref menu) = self.menu {
            builder = builder.with_menu(Box::new(build_native_menu(menu)?));
        }

        let tray_icon = builder.build().context("Failed to create tray icon")?;
        self.tray_icon = Some(tray_icon);
        self.initialized = true;

        tracing::info!("Tray icon initialized");
        Ok(())
    }

    /// Tray icons are only shown on macOS; elsewhere this is a no-op.
    #[cfg(not(target_os = "macos"))]
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        tracing::debug!("Native tray icon is only supported on macOS");
        self.initialized = true;
        Ok(())
    }

    #[cfg(target_os = "macos")]
    fn set_native_icon(&self, bitmap: &TrayBitmap) {
        let Some(ref tray_icon) = self.tray_icon else {
            return;
        };
        let rgba = bitmap.clone().into_rgba();
        match tray_icon::Icon::from_rgba(rgba, bitmap.width(), bitmap.height()) {
            Ok(icon) => {
                if let Err(e) = tray_icon.set_icon(Some(icon)) {
                    tracing::warn!("Failed to update tray icon: {}", e);
                }
            }
            Err(e) => tracing::warn!("Invalid tray bitmap: {}", e),
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn set_native_icon(&self, _bitmap: &TrayBitmap) {}

    #[cfg(target_os = "macos")]
    fn set_native_texts(&self, snapshot: &TimerSnapshot) {
        if let Some(ref tray_icon) = self.tray_icon {
            tray_icon.set_title(Some(self.icon_manager.generate_title(snapshot)));
            if let Err(e) = tray_icon.set_tooltip(Some(tooltip(snapshot))) {
                tracing::warn!("Failed to update tray tooltip: {}", e);
            }
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn set_native_texts(&self, _snapshot: &TimerSnapshot) {}

    #[cfg(target_os = "macos")]
    fn set_native_menu(&self, config: &MenuConfig) {
        let Some(ref tray_icon) = self.tray_icon else {
            return;
        };
        match build_native_menu(config) {
            Ok(menu) => tray_icon.set_menu(Some(Box::new(menu))),
            Err(e) => tracing::warn!("Failed to rebuild tray menu: {}", e),
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn set_native_menu(&self, _config: &MenuConfig) {}
}

/// Builds a native menu from the model (macOS only).
#[cfg(target_os = "macos")]
fn build_native_menu(config: &MenuConfig) -> anyhow::Result<tray_icon::menu::Menu> {
    use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};

    let item = |c: &MenuItemConfig| MenuItem::with_id(c.id.as_str(), &c.text, c.enabled, None);

    let menu = Menu::new();
    menu.append(&item(&config.title))?;
    menu.append(&PredefinedMenuItem::separator())?;
    for status in &config.status_items {
        menu.append(&item(status))?;
    }
    menu.append(&PredefinedMenuItem::separator())?;
    for action in &config.actions {
        menu.append(&item(action))?;
    }
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&item(&config.quit))?;

    Ok(menu)
}

impl std::fmt::Debug for TrayIconManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIconManager")
            .field("initialized", &self.initialized)
            .field("icon_manager", &self.icon_manager)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
