//! Kate-compatible XML definition parsing.
//!
//! This is the first loading stage: it reads the document into an unresolved
//! form where every reference is still a string. [`link`](crate::link) turns
//! that into a validated [`Grammar`](crate::Grammar).

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::LoadError;
use crate::grammar::CommentTokens;
use crate::meta::GrammarMeta;

const UNNAMED: &str = "<unnamed>";

/// A context reference as written: `Ctx`, `##Language` or `Ctx##Language`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTarget {
	pub context: Option<String>,
	pub language: Option<String>,
}

impl RawTarget {
	pub(crate) fn parse(text: &str) -> Self {
		match text.split_once("##") {
			Some((ctx, lang)) => Self {
				context: (!ctx.is_empty()).then(|| ctx.to_string()),
				language: Some(lang.to_string()),
			},
			None => Self {
				context: Some(text.to_string()),
				language: None,
			},
		}
	}
}

impl std::fmt::Display for RawTarget {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match (&self.context, &self.language) {
			(Some(ctx), Some(lang)) => write!(f, "{ctx}##{lang}"),
			(None, Some(lang)) => write!(f, "##{lang}"),
			(Some(ctx), None) => f.write_str(ctx),
			(None, None) => Ok(()),
		}
	}
}

/// An unresolved context switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawSwitch {
	pub pop: u16,
	pub push: Vec<RawTarget>,
}

impl RawSwitch {
	/// Parses `#stay`, `#pop#pop`, `#pop!Ctx!Other`, `Ctx`, `##Lang`.
	pub(crate) fn parse(text: &str) -> Option<Self> {
		let text = text.trim();
		if text.is_empty() || text == "#stay" {
			return Some(Self::default());
		}

		let mut rest = text;
		let mut pop = 0u16;
		while let Some(tail) = rest.strip_prefix("#pop") {
			pop = pop.saturating_add(1);
			rest = tail;
		}

		if pop == 0 {
			return Some(Self {
				pop,
				push: vec![RawTarget::parse(rest)],
			});
		}
		if rest.is_empty() {
			return Some(Self { pop, push: Vec::new() });
		}

		let targets = rest.strip_prefix('!')?;
		let push = targets
			.split('!')
			.map(|t| (!t.is_empty()).then(|| RawTarget::parse(t)))
			.collect::<Option<Vec<_>>>()?;
		Some(Self { pop, push })
	}

	pub(crate) fn is_stay(&self) -> bool {
		self.pop == 0 && self.push.is_empty()
	}
}

#[derive(Debug, Clone)]
pub(crate) enum RawRuleKind {
	DetectChar(String),
	Detect2Chars(char, char),
	AnyChar(String),
	StringDetect(String),
	WordDetect(String),
	Keyword(String),
	RegExpr(String),
	Int,
	Float,
	HlCOct,
	HlCHex,
	HlCStringChar,
	HlCChar,
	RangeDetect(String, String),
	LineContinue(char),
	DetectSpaces,
	DetectIdentifier,
	IncludeRules { target: RawTarget, include_attrib: bool },
}

#[derive(Debug, Clone)]
pub(crate) struct RawRule {
	pub element: String,
	pub kind: RawRuleKind,
	pub attribute: Option<String>,
	pub switch: RawSwitch,
	pub look_ahead: bool,
	pub first_non_space: bool,
	pub column: Option<usize>,
	pub dynamic: bool,
	pub insensitive: bool,
	pub children: Vec<RawRule>,
}

impl RawRule {
	/// Short description used in error messages.
	pub(crate) fn describe(&self) -> String {
		match &self.kind {
			RawRuleKind::DetectChar(s)
			| RawRuleKind::AnyChar(s)
			| RawRuleKind::StringDetect(s)
			| RawRuleKind::WordDetect(s)
			| RawRuleKind::Keyword(s)
			| RawRuleKind::RegExpr(s) => format!("{} {s:?}", self.element),
			RawRuleKind::RangeDetect(b, e) => format!("{} {b:?}..{e:?}", self.element),
			_ => self.element.clone(),
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) struct RawContext {
	pub name: String,
	pub attribute: Option<String>,
	pub line_end: RawSwitch,
	pub line_empty: Option<RawSwitch>,
	pub fallthrough: Option<RawSwitch>,
	pub rules: Vec<RawRule>,
}

#[derive(Debug, Clone)]
pub(crate) struct RawList {
	pub name: String,
	pub items: Vec<String>,
	pub includes: Vec<RawTarget>,
}

#[derive(Debug, Clone)]
pub(crate) struct RawItemData {
	pub name: String,
	pub style: String,
}

/// A parsed, unresolved definition.
#[derive(Debug, Clone)]
pub(crate) struct RawGrammar {
	pub meta: GrammarMeta,
	pub lists: Vec<RawList>,
	pub contexts: Vec<RawContext>,
	pub item_datas: Vec<RawItemData>,
	pub keywords_case_sensitive: bool,
	pub weak_deliminators: String,
	pub additional_deliminators: String,
	pub comments: CommentTokens,
}

impl RawGrammar {
	/// Languages referenced through `##Language` anywhere in the definition.
	pub(crate) fn referenced_languages(&self) -> Vec<&str> {
		let mut targets: Vec<&RawTarget> = Vec::new();
		for ctx in &self.contexts {
			targets.extend(&ctx.line_end.push);
			for switch in ctx.line_empty.iter().chain(&ctx.fallthrough) {
				targets.extend(&switch.push);
			}
			for rule in &ctx.rules {
				collect_rule_targets(rule, &mut targets);
			}
		}
		for list in &self.lists {
			targets.extend(&list.includes);
		}

		let mut out: Vec<&str> = Vec::new();
		for lang in targets.into_iter().filter_map(|t| t.language.as_deref()) {
			if !out.contains(&lang) {
				out.push(lang);
			}
		}
		out
	}
}

fn collect_rule_targets<'a>(rule: &'a RawRule, out: &mut Vec<&'a RawTarget>) {
	out.extend(&rule.switch.push);
	if let RawRuleKind::IncludeRules { target, .. } = &rule.kind {
		out.push(target);
	}
	for child in &rule.children {
		collect_rule_targets(child, out);
	}
}

fn parse_document(text: &str) -> Result<Document<'_>, LoadError> {
	let opts = ParsingOptions {
		allow_dtd: true,
		..ParsingOptions::default()
	};
	Document::parse_with_options(text, opts).map_err(|e| LoadError::Xml {
		grammar: UNNAMED.to_string(),
		message: e.to_string(),
	})
}

/// Reads only the `<language>` header of a definition.
pub fn parse_meta(text: &str) -> Result<GrammarMeta, LoadError> {
	let doc = parse_document(text)?;
	language_meta(doc.root_element())
}

pub(crate) fn parse(text: &str) -> Result<RawGrammar, LoadError> {
	let doc = parse_document(text)?;
	let root = doc.root_element();
	let meta = language_meta(root)?;
	let p = Parser { grammar: &meta.name };

	let mut raw = RawGrammar {
		keywords_case_sensitive: match root.attribute("casesensitive") {
			Some(v) => p.flag("casesensitive", v)?,
			None => true,
		},
		meta: meta.clone(),
		lists: Vec::new(),
		contexts: Vec::new(),
		item_datas: Vec::new(),
		weak_deliminators: String::new(),
		additional_deliminators: String::new(),
		comments: CommentTokens::default(),
	};

	let highlighting = child(root, "highlighting").ok_or_else(|| p.missing("highlighting"))?;
	for node in elements(highlighting) {
		match node.tag_name().name() {
			"list" => raw.lists.push(p.list(node)?),
			"contexts" => {
				for ctx in elements(node).filter(|n| n.has_tag_name("context")) {
					raw.contexts.push(p.context(ctx)?);
				}
			}
			"itemDatas" => {
				for item in elements(node).filter(|n| n.has_tag_name("itemData")) {
					raw.item_datas.push(RawItemData {
						name: p.required(item, "name")?.to_string(),
						style: item.attribute("defStyleNum").unwrap_or("dsNormal").to_string(),
					});
				}
			}
			_ => {}
		}
	}

	if let Some(general) = child(root, "general") {
		if let Some(keywords) = child(general, "keywords") {
			if let Some(v) = keywords.attribute("casesensitive") {
				raw.keywords_case_sensitive = p.flag("casesensitive", v)?;
			}
			raw.weak_deliminators = keywords.attribute("weakDeliminator").unwrap_or("").to_string();
			raw.additional_deliminators = keywords.attribute("additionalDeliminator").unwrap_or("").to_string();
		}
		if let Some(comments) = child(general, "comments") {
			for comment in elements(comments).filter(|n| n.has_tag_name("comment")) {
				match (comment.attribute("name"), comment.attribute("start")) {
					(Some("singleLine"), Some(start)) => raw.comments.single_line = Some(start.to_string()),
					(Some("multiLine"), Some(start)) => {
						let end = comment.attribute("end").unwrap_or("").to_string();
						raw.comments.multi_line = Some((start.to_string(), end));
					}
					_ => {}
				}
			}
		}
	}

	Ok(raw)
}

fn language_meta(root: Node<'_, '_>) -> Result<GrammarMeta, LoadError> {
	if !root.has_tag_name("language") {
		return Err(LoadError::MissingElement {
			grammar: UNNAMED.to_string(),
			element: "language".to_string(),
		});
	}
	let name = root.attribute("name").ok_or_else(|| LoadError::MissingElement {
		grammar: UNNAMED.to_string(),
		element: "language@name".to_string(),
	})?;
	let p = Parser { grammar: name };

	let list = |attr: &str| -> Vec<String> {
		root.attribute(attr)
			.map(|v| v.split(';').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
			.unwrap_or_default()
	};
	let text = |attr: &str| root.attribute(attr).unwrap_or("").to_string();

	Ok(GrammarMeta {
		name: name.to_string(),
		section: text("section"),
		extensions: list("extensions"),
		mime_types: list("mimetype"),
		version: text("version"),
		kate_version: text("kateversion"),
		priority: match root.attribute("priority") {
			Some(v) => v.trim().parse().map_err(|_| p.invalid("priority", v))?,
			None => 0,
		},
		author: text("author"),
		license: text("license"),
		hidden: match root.attribute("hidden") {
			Some(v) => p.flag("hidden", v)?,
			None => false,
		},
		indenter: root.attribute("indenter").map(str::to_string),
	})
}

fn elements<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
	node.children().filter(Node::is_element)
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
	elements(node).find(|n| n.has_tag_name(name))
}

/// Error-context carrier for one definition.
struct Parser<'g> {
	grammar: &'g str,
}

impl Parser<'_> {
	fn missing(&self, element: &str) -> LoadError {
		LoadError::MissingElement {
			grammar: self.grammar.to_string(),
			element: element.to_string(),
		}
	}

	fn invalid(&self, attribute: &str, value: &str) -> LoadError {
		LoadError::InvalidAttribute {
			grammar: self.grammar.to_string(),
			attribute: attribute.to_string(),
			value: value.to_string(),
		}
	}

	fn required<'a>(&self, node: Node<'a, '_>, attr: &str) -> Result<&'a str, LoadError> {
		node.attribute(attr)
			.ok_or_else(|| self.missing(&format!("{}@{attr}", node.tag_name().name())))
	}

	fn flag(&self, attr: &str, value: &str) -> Result<bool, LoadError> {
		match value.trim() {
			"1" | "true" | "TRUE" | "True" => Ok(true),
			"0" | "false" | "FALSE" | "False" | "" => Ok(false),
			_ => Err(self.invalid(attr, value)),
		}
	}

	fn opt_flag(&self, node: Node<'_, '_>, attr: &str) -> Result<bool, LoadError> {
		node.attribute(attr).map_or(Ok(false), |v| self.flag(attr, v))
	}

	fn switch(&self, attr: &str, value: &str) -> Result<RawSwitch, LoadError> {
		RawSwitch::parse(value).ok_or_else(|| self.invalid(attr, value))
	}

	fn single_char(&self, node: Node<'_, '_>, attr: &str) -> Result<char, LoadError> {
		let value = self.required(node, attr)?;
		let mut chars = value.chars();
		match (chars.next(), chars.next()) {
			(Some(ch), None) => Ok(ch),
			_ => Err(self.invalid(attr, value)),
		}
	}

	fn list(&self, node: Node<'_, '_>) -> Result<RawList, LoadError> {
		let mut list = RawList {
			name: self.required(node, "name")?.to_string(),
			items: Vec::new(),
			includes: Vec::new(),
		};
		for item in elements(node) {
			let text = item.text().map(str::trim).unwrap_or("");
			if text.is_empty() {
				continue;
			}
			match item.tag_name().name() {
				"item" => list.items.push(text.to_string()),
				"include" => list.includes.push(RawTarget::parse(text)),
				_ => {}
			}
		}
		Ok(list)
	}

	fn context(&self, node: Node<'_, '_>) -> Result<RawContext, LoadError> {
		let name = self.required(node, "name")?.to_string();
		let line_end = self.switch("lineEndContext", node.attribute("lineEndContext").unwrap_or("#stay"))?;
		let line_empty = node
			.attribute("lineEmptyContext")
			.map(|v| self.switch("lineEmptyContext", v))
			.transpose()?;

		let explicit = node.attribute("fallthrough").map(|v| self.flag("fallthrough", v)).transpose()?;
		let fallthrough = match node.attribute("fallthroughContext") {
			Some(v) if explicit != Some(false) => Some(self.switch("fallthroughContext", v)?).filter(|s| !s.is_stay()),
			_ => None,
		};

		let rules = elements(node).map(|r| self.rule(&name, r)).collect::<Result<_, _>>()?;

		Ok(RawContext {
			name,
			attribute: node.attribute("attribute").map(str::to_string),
			line_end,
			line_empty,
			fallthrough,
			rules,
		})
	}

	fn rule(&self, context: &str, node: Node<'_, '_>) -> Result<RawRule, LoadError> {
		let element = node.tag_name().name();
		let string = |attr: &str| self.required(node, attr).map(str::to_string);

		let kind = match element {
			"DetectChar" => RawRuleKind::DetectChar(string("char")?),
			"Detect2Chars" => RawRuleKind::Detect2Chars(self.single_char(node, "char")?, self.single_char(node, "char1")?),
			"AnyChar" => RawRuleKind::AnyChar(string("String")?),
			"StringDetect" => RawRuleKind::StringDetect(string("String")?),
			"WordDetect" => RawRuleKind::WordDetect(string("String")?),
			"keyword" => RawRuleKind::Keyword(string("String")?),
			"RegExpr" => RawRuleKind::RegExpr(string("String")?),
			"Int" => RawRuleKind::Int,
			"Float" => RawRuleKind::Float,
			"HlCOct" => RawRuleKind::HlCOct,
			"HlCHex" => RawRuleKind::HlCHex,
			"HlCStringChar" => RawRuleKind::HlCStringChar,
			"HlCChar" => RawRuleKind::HlCChar,
			"RangeDetect" => {
				let either = |a: &str, b: &str| match node.attribute(a).or_else(|| node.attribute(b)) {
					Some(v) => Ok(v.to_string()),
					None => Err(self.missing(&format!("RangeDetect@{a}"))),
				};
				RawRuleKind::RangeDetect(either("char", "String")?, either("char1", "end")?)
			}
			"LineContinue" => RawRuleKind::LineContinue(match node.attribute("char") {
				Some(_) => self.single_char(node, "char")?,
				None => '\\',
			}),
			"DetectSpaces" => RawRuleKind::DetectSpaces,
			"DetectIdentifier" => RawRuleKind::DetectIdentifier,
			"IncludeRules" => RawRuleKind::IncludeRules {
				target: RawTarget::parse(self.required(node, "context")?),
				include_attrib: self.opt_flag(node, "includeAttrib")?,
			},
			_ => {
				return Err(LoadError::UnknownRule {
					grammar: self.grammar.to_string(),
					context: context.to_string(),
					element: element.to_string(),
				});
			}
		};

		let column = node
			.attribute("column")
			.map(|v| v.trim().parse::<usize>().map_err(|_| self.invalid("column", v)))
			.transpose()?;

		Ok(RawRule {
			element: element.to_string(),
			kind,
			attribute: node.attribute("attribute").map(str::to_string),
			switch: self.switch("context", node.attribute("context").unwrap_or("#stay"))?,
			look_ahead: self.opt_flag(node, "lookAhead")?,
			first_non_space: self.opt_flag(node, "firstNonSpace")?,
			column,
			dynamic: self.opt_flag(node, "dynamic")?,
			insensitive: self.opt_flag(node, "insensitive")?,
			children: elements(node).map(|c| self.rule(context, c)).collect::<Result<_, _>>()?,
		})
	}
}
