//! Mobile navigation model
//!
//! Bottom bar and sidebar entries with their active state, plus the
//! edge-swipe gesture that opens the sidebar sheet.
use serde::Serialize;

/// Minimum rightward travel, in pixels, that opens the sidebar
pub const SWIPE_OPEN_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    Navigate,
    OpenComposer,
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: Option<&'static str>,
    pub action: NavAction,
    pub premium: bool,
    pub active: bool,
}

impl NavItem {
    fn link(label: &'static str, path: &'static str) -> Self {
        Self {
            label,
            path: Some(path),
            action: NavAction::Navigate,
            premium: false,
            active: false,
        }
    }

    fn command(label: &'static str, action: NavAction) -> Self {
        Self {
            label,
            path: None,
            action,
            premium: false,
            active: false,
        }
    }

    fn mark_active(mut self, current_path: &str) -> Self {
        self.active = self.path == Some(current_path);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationMenu {
    pub bottom: Vec<NavItem>,
    pub sidebar: Vec<NavItem>,
}

fn bottom_items() -> Vec<NavItem> {
    vec![
        NavItem::link("Home", "/dashboard"),
        NavItem::link("Messages", "/messages"),
        NavItem::link("Notifications", "/notifications"),
        NavItem::link("Videos", "/videos"),
        NavItem::link("Profile", "/profile"),
    ]
}

fn sidebar_items() -> Vec<NavItem> {
    let mut items = bottom_items();
    items.push(NavItem::link("Analytics", "/analytics"));
    items.push(NavItem {
        premium: true,
        ..NavItem::link("Premium", "/premium")
    });
    items.push(NavItem::command("Create Post", NavAction::OpenComposer));
    items.push(NavItem::link("Settings", "/settings"));
    items.push(NavItem::command("Logout", NavAction::SignOut));
    items
}

/// Navigation entries with the one matching `current_path` marked active
pub fn menu_for(current_path: &str) -> NavigationMenu {
    NavigationMenu {
        bottom: bottom_items()
            .into_iter()
            .map(|item| item.mark_active(current_path))
            .collect(),
        sidebar: sidebar_items()
            .into_iter()
            .map(|item| item.mark_active(current_path))
            .collect(),
    }
}

/// Touch gesture state for the sidebar sheet
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start_x: Option<f64>,
    sheet_open: bool,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Returns true when this gesture opened the sheet
    pub fn touch_end(&mut self, x: f64) -> bool {
        let Some(start) = self.start_x.take() else {
            return false;
        };

        if x - start > SWIPE_OPEN_THRESHOLD {
            self.sheet_open = true;
            return true;
        }
        false
    }

    pub fn is_sheet_open(&self) -> bool {
        self.sheet_open
    }

    pub fn close_sheet(&mut self) {
        self.sheet_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_item_matches_exact_path() {
        let menu = menu_for("/videos");
        let active: Vec<_> = menu.bottom.iter().filter(|i| i.active).map(|i| i.label).collect();
        assert_eq!(active, vec!["Videos"]);

        let menu = menu_for("/videos/123");
        assert!(menu.bottom.iter().all(|i| !i.active));
    }

    #[test]
    fn test_sidebar_extends_bottom_bar() {
        let menu = menu_for("/dashboard");
        let labels: Vec<_> = menu.sidebar.iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            vec![
                "Home",
                "Messages",
                "Notifications",
                "Videos",
                "Profile",
                "Analytics",
                "Premium",
                "Create Post",
                "Settings",
                "Logout"
            ]
        );
        assert!(menu.sidebar.iter().find(|i| i.label == "Premium").unwrap().premium);
        assert_eq!(
            menu.sidebar.last().map(|i| i.action),
            Some(NavAction::SignOut)
        );
    }

    #[test]
    fn test_swipe_threshold() {
        let mut swipe = SwipeTracker::new();
        swipe.touch_start(10.0);
        assert!(!swipe.touch_end(60.0));
        assert!(!swipe.is_sheet_open());

        swipe.touch_start(10.0);
        assert!(swipe.touch_end(61.0));
        assert!(swipe.is_sheet_open());
    }

    #[test]
    fn test_leftward_swipe_and_reset() {
        let mut swipe = SwipeTracker::new();
        swipe.touch_start(200.0);
        assert!(!swipe.touch_end(20.0));
        // start position is consumed by the previous touch end
        assert!(!swipe.touch_end(400.0));
    }
}
