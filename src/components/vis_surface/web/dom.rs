//! [`TemplateHost`] over a DOM container element.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlInputElement, HtmlSelectElement};

use super::super::graph::{SelectControl, TemplateHost, ToggleControl};

type Listeners = Rc<RefCell<Vec<Closure<dyn FnMut(Event)>>>>;

/// Instantiates graph templates inside `container`.
///
/// Change listeners installed on the controls live as long as the host.
#[derive(Clone)]
pub struct DomHost {
	container: Element,
	listeners: Listeners,
}

impl DomHost {
	/// Host instantiating templates inside `container`.
	pub fn new(container: Element) -> Self {
		Self {
			container,
			listeners: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Element templates are inserted into.
	pub fn container(&self) -> &Element {
		&self.container
	}

	fn select_all<T: JsCast>(&self, selector: &str) -> Vec<T> {
		let Ok(list) = self.container.query_selector_all(selector) else {
			return Vec::new();
		};
		(0..list.length())
			.filter_map(|i| list.item(i))
			.filter_map(|node| node.dyn_into::<T>().ok())
			.collect()
	}
}

impl TemplateHost for DomHost {
	type Mount = Element;
	type Toggle = DomToggle;
	type Select = DomSelect;

	fn insert_template(&self, html: &str) {
		self.listeners.borrow_mut().clear();
		self.container.set_inner_html(html);
	}

	fn mounts(&self) -> Vec<Element> {
		self.select_all("vis-network")
	}

	fn physics_toggles(&self) -> Vec<DomToggle> {
		self.select_all::<HtmlInputElement>(r#"input[name="physicsEnabled"]"#)
			.into_iter()
			.map(|input| DomToggle {
				input,
				listeners: self.listeners.clone(),
			})
			.collect()
	}

	fn layout_selectors(&self) -> Vec<DomSelect> {
		self.select_all::<HtmlSelectElement>(r#"select[name="layout"]"#)
			.into_iter()
			.map(|select| DomSelect {
				select,
				listeners: self.listeners.clone(),
			})
			.collect()
	}

	fn root_class(&self) -> Option<String> {
		self.container
			.first_element_child()
			.map(|root| root.class_name())
	}

	fn set_root_class(&self, class: &str) {
		if let Some(root) = self.container.first_element_child() {
			root.set_class_name(class);
		}
	}
}

/// `input[name="physicsEnabled"]`
pub struct DomToggle {
	input: HtmlInputElement,
	listeners: Listeners,
}

impl ToggleControl for DomToggle {
	fn checked(&self) -> bool {
		self.input.checked()
	}

	fn set_checked(&self, checked: bool) {
		self.input.set_checked(checked);
	}

	fn on_change(&self, handler: Box<dyn Fn(bool)>) {
		let input = self.input.clone();
		let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
			event.prevent_default();
			handler(input.checked());
		});
		self.input
			.set_onchange(Some(listener.as_ref().unchecked_ref()));
		self.listeners.borrow_mut().push(listener);
	}
}

/// `select[name="layout"]`
pub struct DomSelect {
	select: HtmlSelectElement,
	listeners: Listeners,
}

impl SelectControl for DomSelect {
	fn value(&self) -> String {
		self.select.value()
	}

	fn set_value(&self, value: &str) {
		self.select.set_value(value);
	}

	fn on_change(&self, handler: Box<dyn Fn(String)>) {
		let select = self.select.clone();
		let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
			event.prevent_default();
			handler(select.value());
		});
		self.select
			.set_onchange(Some(listener.as_ref().unchecked_ref()));
		self.listeners.borrow_mut().push(listener);
	}
}
