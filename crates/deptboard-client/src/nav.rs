//! Main-screen navigation state machine.

use deptboard_core::DepartmentId;
use strum::{Display, EnumString};

use crate::{Error, Result, view::Role};

/// Bottom-bar tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
  #[default]
  Home,
  Events,
  Calendar,
  Forum,
  Profile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
  #[default]
  Home,
  Detail(DepartmentId),
  /// The control centre, remembering the tab it was opened from.
  Admin { return_tab: Tab },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
  pub view: View,
  pub tab:  Tab,
}

impl Navigation {
  pub fn new() -> Self { Self::default() }

  pub fn selected_department(&self) -> Option<DepartmentId> {
    match self.view {
      View::Detail(id) => Some(id),
      _ => None,
    }
  }

  /// Open a department's detail view from the home view.
  pub fn select_department(&mut self, id: DepartmentId) -> Result<()> {
    if self.view != View::Home {
      return Err(Error::NotAvailable("department detail"));
    }
    self.view = View::Detail(id);
    Ok(())
  }

  /// Leave a detail view. No-op elsewhere.
  pub fn back(&mut self) {
    if let View::Detail(_) = self.view {
      self.view = View::Home;
    }
  }

  /// Open the control centre. Only reachable from the profile tab, and only
  /// for admin-or-above.
  pub fn open_admin(&mut self, role: Role) -> Result<()> {
    if self.tab != Tab::Profile || matches!(self.view, View::Admin { .. }) {
      return Err(Error::NotAvailable("control centre"));
    }
    if !role.is_admin() {
      return Err(Error::Forbidden { action: "open the control centre", role });
    }
    self.view = View::Admin { return_tab: self.tab };
    Ok(())
  }

  /// Close the control centre and return to the tab it was opened from.
  pub fn close_admin(&mut self) {
    if let View::Admin { return_tab } = self.view {
      self.tab = return_tab;
      self.view = View::Home;
    }
  }

  /// Switch tabs. Always lands on the home view.
  pub fn select_tab(&mut self, tab: Tab) {
    self.tab = tab;
    self.view = View::Home;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_home() {
    let nav = Navigation::new();
    assert_eq!(nav.view, View::Home);
    assert_eq!(nav.tab, Tab::Home);
    assert_eq!(nav.selected_department(), None);
  }

  #[test]
  fn detail_and_back() {
    let mut nav = Navigation::new();
    nav.select_department(4).unwrap();
    assert_eq!(nav.view, View::Detail(4));
    assert_eq!(nav.selected_department(), Some(4));

    assert!(matches!(nav.select_department(5), Err(Error::NotAvailable(_))));

    nav.back();
    assert_eq!(nav.view, View::Home);
    assert_eq!(nav.selected_department(), None);
  }

  #[test]
  fn admin_requires_profile_tab() {
    let mut nav = Navigation::new();
    assert!(matches!(nav.open_admin(Role::SuperAdmin), Err(Error::NotAvailable(_))));
    assert_eq!(nav.view, View::Home);
  }

  #[test]
  fn admin_requires_admin_role() {
    let mut nav = Navigation::new();
    nav.select_tab(Tab::Profile);
    assert!(matches!(nav.open_admin(Role::User), Err(Error::Forbidden { .. })));
    assert_eq!(nav.view, View::Home);

    nav.open_admin(Role::Admin).unwrap();
    assert_eq!(nav.view, View::Admin { return_tab: Tab::Profile });
  }

  #[test]
  fn close_admin_returns_to_previous_tab() {
    let mut nav = Navigation::new();
    nav.select_tab(Tab::Profile);
    nav.open_admin(Role::SuperAdmin).unwrap();

    nav.close_admin();
    assert_eq!(nav, Navigation { view: View::Home, tab: Tab::Profile });
  }

  #[test]
  fn tab_switch_resets_view() {
    let mut nav = Navigation::new();
    nav.select_department(2).unwrap();
    nav.select_tab(Tab::Forum);
    assert_eq!(nav.view, View::Home);

    nav.select_tab(Tab::Profile);
    nav.open_admin(Role::Admin).unwrap();
    nav.select_tab(Tab::Calendar);
    assert_eq!(nav, Navigation { view: View::Home, tab: Tab::Calendar });
  }

  #[test]
  fn tab_names() {
    assert_eq!("calendar".parse::<Tab>().unwrap(), Tab::Calendar);
    assert_eq!(Tab::Events.to_string(), "events");
  }
}
