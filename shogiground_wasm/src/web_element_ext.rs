use wasm_bindgen::JsCast;

use shogiground::util::Point;

use crate::web_document::web_document;
use crate::web_error_handling::JsResult;


pub trait WebElementExt {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element>;
    fn with_classes<'a>(self, classes: impl IntoIterator<Item = &'a str>) -> JsResult<web_sys::Element>;
    fn with_svg_attributes<'a>(
        self, attributes: impl IntoIterator<Item = (&'a str, String)>,
    ) -> JsResult<web_sys::Element>;

    fn set_displayed(&self, displayed: bool) -> JsResult<()>;
    // Positions an absolutely placed element relative to its container, in pixels.
    fn set_translate(&self, pos: Point) -> JsResult<()>;
    fn set_size(&self, width: f64, height: f64) -> JsResult<()>;

    fn remove_all_children(&self);

    fn append_new_element(&self, local_name: &str, class: &str) -> JsResult<web_sys::Element>;
    fn append_new_svg_element(&self, local_name: &str) -> JsResult<web_sys::Element>;
}

fn html_style(element: &web_sys::Element) -> JsResult<web_sys::CssStyleDeclaration> {
    element
        .dyn_ref::<web_sys::HtmlElement>()
        .map(web_sys::HtmlElement::style)
        .ok_or_else(|| rust_error!("Element <{}> has no style", element.tag_name()))
}

impl WebElementExt for web_sys::Element {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    fn with_classes<'a>(self, classes: impl IntoIterator<Item = &'a str>) -> JsResult<web_sys::Element> {
        for class in classes {
            self.class_list().add_1(class)?;
        }
        Ok(self)
    }

    fn with_svg_attributes<'a>(
        self, attributes: impl IntoIterator<Item = (&'a str, String)>,
    ) -> JsResult<web_sys::Element> {
        for (name, value) in attributes {
            self.set_attribute(name, &value)?;
        }
        Ok(self)
    }

    fn set_displayed(&self, displayed: bool) -> JsResult<()> {
        self.class_list().toggle_with_force("display-none", !displayed)?;
        Ok(())
    }

    fn set_translate(&self, (x, y): Point) -> JsResult<()> {
        html_style(self)?.set_property("transform", &format!("translate({x}px,{y}px)"))
    }

    fn set_size(&self, width: f64, height: f64) -> JsResult<()> {
        let style = html_style(self)?;
        style.set_property("width", &format!("{width}px"))?;
        style.set_property("height", &format!("{height}px"))
    }

    fn remove_all_children(&self) { self.replace_children_with_node_0() }

    // Improvement potential. Check if fetching `web_document()` every time slows down functions
    // that create a lot of elements (here and elsewhere).
    fn append_new_element(&self, local_name: &str, class: &str) -> JsResult<web_sys::Element> {
        let node = web_document()?.create_element(local_name)?;
        if !class.is_empty() {
            node.set_class_name(class);
        }
        self.append_child(&node)?;
        Ok(node)
    }

    fn append_new_svg_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        let node = web_document()?.create_svg_element(local_name)?;
        self.append_child(&node)?;
        Ok(node)
    }
}
