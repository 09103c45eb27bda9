use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::selector::{
    SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorPseudoClass, SelectorStep,
    parse_selector_groups,
};

/// Handle to a node in a page's DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
}

impl Element {
    fn new(tag_name: String, attrs: HashMap<String, String>) -> Self {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        Self {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
            readonly,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let id = self.create_node(Some(parent), NodeType::Element(Element::new(tag_name, attrs)));
        if let Some(id_attr) = self.attr(id, "id") {
            if self.is_connected(id) && !id_attr.is_empty() {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element::new(tag_name.to_ascii_lowercase(), HashMap::new());
        self.create_node(None, NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn is_tag(&self, node_id: NodeId, tag: &str) -> bool {
        self.tag_name(node_id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::runtime("textContent target is not an element"));
        }
        self.clear_children(node_id)?;
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::runtime("value target is not an element"))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::runtime("value target is not an element"))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::runtime("checked target is not an element"))?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.readonly).unwrap_or(false)
    }

    pub(crate) fn initialize_form_control_values(&mut self) {
        for node in self.all_element_nodes() {
            if self.is_tag(node, "textarea") {
                let text = self.text_content(node);
                if let Some(element) = self.element_mut(node) {
                    element.value = text;
                }
            }
        }
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|e| e.attrs.get(&name.to_ascii_lowercase()).cloned())
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        {
            let element = self
                .element_mut(node_id)
                .ok_or_else(|| Error::runtime("setAttribute target is not an element"))?;
            element.attrs.insert(lowered.clone(), value.to_string());
            match lowered.as_str() {
                "value" => element.value = value.to_string(),
                "checked" => element.checked = true,
                "disabled" => element.disabled = true,
                "readonly" => element.readonly = true,
                _ => {}
            }
        }
        if lowered == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::runtime("appendChild target cannot have children"));
        }
        if child == self.root || child == parent || !self.is_valid_node(child) {
            return Err(Error::runtime("invalid appendChild node"));
        }

        // Parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::runtime("appendChild would create a cycle"));
            }
            cursor = self.parent(node);
        }

        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        if !self.can_have_children(node_id) {
            return Err(Error::runtime("target cannot have children"));
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        let had_elements = !old_children.is_empty();
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if had_elements {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn style_get(&self, node_id: NodeId, property: &str) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::runtime("style target is not an element"))?;
        let name = css_property_name(property);
        let decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .into_iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value)
            .unwrap_or_default())
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let name = css_property_name(property);
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::runtime("style target is not an element"))?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::runtime("classList target is not an element"))?;
        Ok(has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::runtime("classList target is not an element"))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::runtime("classList target is not an element"))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    /// Adds or removes `class_name` so that its presence equals `present`.
    pub(crate) fn class_set(
        &mut self,
        node_id: NodeId,
        class_name: &str,
        present: bool,
    ) -> Result<()> {
        if present {
            self.class_add(node_id, class_name)
        } else {
            self.class_remove(node_id, class_name)
        }
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    pub(crate) fn query_selector_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        let all = self.query_selector_all_from(root, selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut ids = Vec::new();
        for child in &self.nodes[root.0].children {
            self.collect_elements_dfs(*child, &mut ids);
        }
        Ok(self.filter_matching(ids, &groups))
    }

    fn filter_matching(
        &self,
        candidates: Vec<NodeId>,
        groups: &[Vec<SelectorPart>],
    ) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in candidates {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        matched
    }

    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.nodes.get(node_id.0).map(|n| &n.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    fn is_valid_node(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id") {
                    if !id.is_empty() {
                        next.entry(id.clone()).or_insert(node);
                    }
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => self
                    .parent(current)
                    .filter(|parent| self.matches_step(*parent, prev_step)),
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
                SelectorCombinator::AdjacentSibling => self
                    .previous_element_sibling(current)
                    .filter(|sibling| self.matches_step(*sibling, prev_step)),
                SelectorCombinator::GeneralSibling => {
                    let mut cursor = self.previous_element_sibling(current);
                    let mut found = None;
                    while let Some(sibling) = cursor {
                        if self.matches_step(sibling, prev_step) {
                            found = Some(sibling);
                            break;
                        }
                        cursor = self.previous_element_sibling(sibling);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        for cond in &step.attrs {
            let matched = match cond {
                SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
                SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
            };
            if !matched {
                return false;
            }
        }

        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::FirstChild => self.previous_element_sibling(node_id).is_none(),
            SelectorPseudoClass::LastChild => self.next_element_sibling(node_id).is_none(),
            SelectorPseudoClass::Not(inners) => !inners
                .iter()
                .any(|inner| self.matches_selector_chain(node_id, inner)),
        })
    }

    pub(crate) fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children
            .iter()
            .skip(pos + 1)
            .copied()
            .find(|sibling| self.element(*sibling).is_some())
    }

    pub(crate) fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children[..pos]
            .iter()
            .rev()
            .copied()
            .find(|sibling| self.element(*sibling).is_some())
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self.is_tag(current, tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort();
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

// Accepts both `backgroundColor` and `background-color`.
fn css_property_name(prop: &str) -> String {
    let mut out = String::new();
    for ch in prop.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for decl in style_attr.split(';') {
        let Some((name, value)) = decl.trim().split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out: String = it.by_ref().take(max_chars).collect();
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
