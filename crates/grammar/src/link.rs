//! Reference resolution, grammar splicing and load-time validation.
//!
//! Linking turns the string-referenced output of [`xml`](crate::xml) into a
//! [`Grammar`]. Grammars referenced through `##Language` are fetched through
//! an [`IncludeResolver`], parsed, and spliced into one context table under
//! `Name##Language` qualified names so they cannot collide with the
//! including grammar's own names.
//!
//! Validation performed here is what makes the block parser total:
//! * every context, attribute and keyword-list reference resolves;
//! * a non-look-ahead rule whose only effect is a context switch cannot
//!   match the empty string;
//! * every `%N` a dynamic context uses is bound by every rule that pushes it.

use std::sync::Arc;

use fancy_regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::attribute::{Attribute, AttributeId, FormatClass};
use crate::context::{Context, ContextId, ContextSwitch};
use crate::dynamic::{self, RegexCache};
use crate::error::LoadError;
use crate::grammar::Grammar;
use crate::keywords::{Deliminators, KeywordList, KeywordListId};
use crate::rule::{CharSet, Pattern, Rule, RuleKind};
use crate::xml::{self, RawGrammar, RawRule, RawRuleKind, RawSwitch, RawTarget};

/// Supplies the definition text of grammars referenced via `##Language`.
pub trait IncludeResolver {
	/// Returns the definition text for `language`, or a human-readable reason
	/// why it is unavailable.
	fn resolve(&self, language: &str) -> Result<String, String>;
}

impl<F> IncludeResolver for F
where
	F: Fn(&str) -> Result<String, String>,
{
	fn resolve(&self, language: &str) -> Result<String, String> {
		self(language)
	}
}

/// Resolver for standalone definitions; every include fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
	fn resolve(&self, _language: &str) -> Result<String, String> {
		Err("no include resolver configured".to_string())
	}
}

/// Loads a definition that may include other grammars.
pub fn load(text: &str, resolver: &dyn IncludeResolver) -> Result<Grammar, LoadError> {
	let root = xml::parse(text)?;
	let grammars = collect(root, resolver)?;
	link(grammars)
}

/// Loads a definition that does not reference other grammars.
pub fn load_standalone(text: &str) -> Result<Grammar, LoadError> {
	load(text, &NoIncludes)
}

/// Parses the root and, transitively, every grammar it references.
///
/// Index 0 is the root. A reference back to any grammar on the current
/// include path, including the root itself, is a cycle.
fn collect(root: RawGrammar, resolver: &dyn IncludeResolver) -> Result<Vec<RawGrammar>, LoadError> {
	struct Collector<'r> {
		resolver: &'r dyn IncludeResolver,
		grammars: Vec<RawGrammar>,
		names: Vec<String>,
	}

	impl Collector<'_> {
		fn visit(&mut self, idx: usize, path: &mut Vec<String>) -> Result<(), LoadError> {
			let refs: Vec<String> = self.grammars[idx]
				.referenced_languages()
				.into_iter()
				.map(str::to_string)
				.collect();

			for lang in refs {
				if path.contains(&lang) {
					let mut cycle = path.clone();
					cycle.push(lang);
					return Err(LoadError::IncludeCycle {
						grammar: self.names[0].clone(),
						path: cycle,
					});
				}
				if self.names.contains(&lang) {
					continue;
				}

				let text = self.resolver.resolve(&lang).map_err(|reason| LoadError::IncludeNotFound {
					grammar: self.names[idx].clone(),
					include: lang.clone(),
					reason,
				})?;
				let raw = xml::parse(&text)?;
				tracing::debug!(grammar = %self.names[0], include = %lang, "splicing included grammar");

				let child = self.grammars.len();
				self.grammars.push(raw);
				self.names.push(lang.clone());

				path.push(lang);
				self.visit(child, path)?;
				path.pop();
			}
			Ok(())
		}
	}

	let root_name = root.meta.name.clone();
	let mut collector = Collector {
		resolver,
		grammars: vec![root],
		names: vec![root_name.clone()],
	};
	collector.visit(0, &mut vec![root_name])?;

	// Spliced grammars are addressed by the name they were referenced with.
	for (raw, name) in collector.grammars.iter_mut().zip(&collector.names) {
		raw.meta.name.clone_from(name);
	}
	Ok(collector.grammars)
}

/// Name lookups shared by every compilation step.
struct Tables {
	names: Vec<String>,
	by_name: FxHashMap<String, usize>,
	context_base: Vec<u32>,
	contexts: Vec<FxHashMap<String, u32>>,
	attrs: Vec<FxHashMap<String, AttributeId>>,
	lists: Vec<FxHashMap<String, KeywordListId>>,
}

impl Tables {
	fn qualify(&self, name: &str, g: usize) -> String {
		if g == 0 { name.to_string() } else { format!("{name}##{}", self.names[g]) }
	}

	/// Resolves a context reference written inside grammar `g`.
	fn target(&self, g: usize, target: &RawTarget) -> Option<(usize, u32)> {
		let tg = match &target.language {
			Some(lang) => *self.by_name.get(lang)?,
			None => g,
		};
		let local = match &target.context {
			Some(ctx) => *self.contexts[tg].get(ctx)?,
			None => 0,
		};
		Some((tg, local))
	}

	fn context_id(&self, g: usize, local: u32) -> ContextId {
		ContextId(self.context_base[g] + local)
	}
}

fn link(raw: Vec<RawGrammar>) -> Result<Grammar, LoadError> {
	let names: Vec<String> = raw.iter().map(|g| g.meta.name.clone()).collect();
	let by_name = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();

	let mut context_base = Vec::with_capacity(raw.len());
	let mut contexts = Vec::with_capacity(raw.len());
	let mut next_context = 0u32;
	for g in &raw {
		if g.contexts.is_empty() {
			return Err(LoadError::NoDefaultContext {
				grammar: g.meta.name.clone(),
			});
		}
		context_base.push(next_context);
		let mut lookup = FxHashMap::default();
		for (i, ctx) in g.contexts.iter().enumerate() {
			lookup.entry(ctx.name.clone()).or_insert(i as u32);
		}
		next_context += g.contexts.len() as u32;
		contexts.push(lookup);
	}

	let mut tables = Tables {
		names,
		by_name,
		context_base,
		contexts,
		attrs: Vec::new(),
		lists: Vec::new(),
	};

	let mut attributes = Vec::new();
	let mut attribute_index = FxHashMap::default();
	for (gi, g) in raw.iter().enumerate() {
		let mut lookup = FxHashMap::default();
		for item in &g.item_datas {
			let format = FormatClass::from_style_name(&item.style).unwrap_or_else(|| {
				tracing::warn!(grammar = %g.meta.name, attribute = %item.name, style = %item.style, "unknown default style, using dsNormal");
				FormatClass::Normal
			});
			let id = AttributeId(attributes.len() as u32);
			if lookup.contains_key(&item.name) {
				continue;
			}
			lookup.insert(item.name.clone(), id);
			let name = tables.qualify(&item.name, gi);
			attribute_index.insert(name.clone().into_boxed_str(), id);
			attributes.push(Attribute {
				name: name.into_boxed_str(),
				format,
			});
		}
		tables.attrs.push(lookup);
	}

	let keyword_lists = build_keyword_lists(&raw, &mut tables)?;
	let deliminators: Vec<Deliminators> = raw
		.iter()
		.map(|g| Deliminators::new(&g.weak_deliminators, &g.additional_deliminators))
		.collect();

	let mut compiler = Compiler {
		raw: &raw,
		tables: &tables,
		declared: next_context,
		extra: Vec::new(),
		continuations: FxHashSet::default(),
		regexes: FxHashMap::default(),
		context_attrs: Vec::new(),
	};
	compiler.resolve_context_attributes()?;

	let mut compiled = Vec::with_capacity(next_context as usize);
	for (gi, g) in raw.iter().enumerate() {
		for ci in 0..g.contexts.len() {
			compiled.push(compiler.context(gi, ci)?);
		}
	}
	let continuations = std::mem::take(&mut compiler.continuations);
	compiled.append(&mut compiler.extra);

	let mut context_index = FxHashMap::default();
	for (i, ctx) in compiled.iter().enumerate() {
		context_index.entry(ctx.name.clone()).or_insert(ContextId(i as u32));
	}

	let root = raw.into_iter().next().ok_or_else(|| LoadError::NoDefaultContext {
		grammar: String::new(),
	})?;

	let grammar = Grammar {
		meta: root.meta,
		contexts: compiled,
		context_index,
		default_context: ContextId(0),
		attributes,
		attribute_index,
		keyword_lists,
		deliminators,
		comments: root.comments,
		regex_cache: RegexCache::default(),
	};

	validate_dynamic_bindings(&grammar, &continuations)?;

	tracing::debug!(
		grammar = %grammar.meta.name,
		contexts = grammar.contexts.len(),
		attributes = grammar.attributes.len(),
		included = tables.names.len() - 1,
		"grammar loaded"
	);
	Ok(grammar)
}

fn build_keyword_lists(raw: &[RawGrammar], tables: &mut Tables) -> Result<Vec<KeywordList>, LoadError> {
	fn words(
		raw: &[RawGrammar],
		tables: &Tables,
		g: usize,
		l: usize,
		visiting: &mut Vec<(usize, usize)>,
		out: &mut Vec<String>,
	) -> Result<(), LoadError> {
		if visiting.contains(&(g, l)) {
			tracing::warn!(grammar = %tables.names[g], list = %raw[g].lists[l].name, "keyword list includes itself, ignoring");
			return Ok(());
		}
		visiting.push((g, l));
		let list = &raw[g].lists[l];
		out.extend(list.items.iter().cloned());
		for include in &list.includes {
			let tg = match &include.language {
				Some(lang) => tables.by_name.get(lang).copied(),
				None => Some(g),
			};
			let tl = tg.and_then(|tg| {
				let name = include.context.as_deref()?;
				raw[tg].lists.iter().position(|x| x.name == name).map(|tl| (tg, tl))
			});
			let Some((tg, tl)) = tl else {
				return Err(LoadError::UnresolvedKeywordList {
					grammar: tables.names[g].clone(),
					context: format!("list {}", list.name),
					list: include.to_string(),
				});
			};
			words(raw, tables, tg, tl, visiting, out)?;
		}
		visiting.pop();
		Ok(())
	}

	let mut lists = Vec::new();
	let mut lookups = Vec::with_capacity(raw.len());
	for (gi, g) in raw.iter().enumerate() {
		let mut lookup = FxHashMap::default();
		for (li, list) in g.lists.iter().enumerate() {
			let mut all = Vec::new();
			words(raw, tables, gi, li, &mut Vec::new(), &mut all)?;
			let id = KeywordListId(lists.len() as u32);
			lookup.entry(list.name.clone()).or_insert(id);
			lists.push(KeywordList::new(tables.qualify(&list.name, gi), all, g.keywords_case_sensitive));
		}
		lookups.push(lookup);
	}
	tables.lists = lookups;
	Ok(lists)
}

/// A rule after `IncludeRules` expansion, with the grammar and context it was
/// written in (which is the namespace its references resolve against).
struct Expanded<'r> {
	grammar: usize,
	context: usize,
	rule: &'r RawRule,
}

struct Compiler<'a> {
	raw: &'a [RawGrammar],
	tables: &'a Tables,
	declared: u32,
	extra: Vec<Context>,
	continuations: FxHashSet<ContextId>,
	regexes: FxHashMap<(String, bool), Arc<Regex>>,
	/// Attribute of every declared context, by context id.
	context_attrs: Vec<AttributeId>,
}

impl<'a> Compiler<'a> {
	fn grammar_name(&self, g: usize) -> String {
		self.tables.names[g].clone()
	}

	fn resolve_context_attributes(&mut self) -> Result<(), LoadError> {
		let raw = self.raw;
		for (gi, g) in raw.iter().enumerate() {
			for ctx in &g.contexts {
				let attr = match &ctx.attribute {
					Some(name) => self.attribute(gi, &ctx.name, name)?,
					None => match g.item_datas.first() {
						Some(first) => self.attribute(gi, &ctx.name, &first.name)?,
						None => {
							return Err(LoadError::MissingElement {
								grammar: self.grammar_name(gi),
								element: format!("context[{}]@attribute", ctx.name),
							});
						}
					},
				};
				self.context_attrs.push(attr);
			}
		}
		Ok(())
	}

	fn attribute(&self, g: usize, context: &str, name: &str) -> Result<AttributeId, LoadError> {
		self.tables.attrs[g]
			.get(name)
			.copied()
			.ok_or_else(|| LoadError::UnresolvedAttribute {
				grammar: self.grammar_name(g),
				context: context.to_string(),
				attribute: name.to_string(),
			})
	}

	fn context_attr(&self, g: usize, local: usize) -> AttributeId {
		self.context_attrs[self.tables.context_id(g, local as u32).idx()]
	}

	fn switch(&self, g: usize, context: &str, raw: &RawSwitch) -> Result<ContextSwitch, LoadError> {
		let mut switch = ContextSwitch::pop(raw.pop);
		for target in &raw.push {
			let (tg, local) = self.tables.target(g, target).ok_or_else(|| LoadError::UnresolvedContext {
				grammar: self.grammar_name(g),
				context: context.to_string(),
				target: target.to_string(),
			})?;
			switch.push.push(self.tables.context_id(tg, local));
		}
		Ok(switch)
	}

	fn context(&mut self, g: usize, c: usize) -> Result<Context, LoadError> {
		let raw = self.raw;
		let ctx = &raw[g].contexts[c];
		let mut attribute = self.context_attr(g, c);

		let mut expanded = Vec::new();
		let mut include_attrib = None;
		self.expand(g, c, &mut Vec::new(), &mut expanded, &mut include_attrib)?;
		if let Some((tg, tc)) = include_attrib {
			attribute = self.context_attr(tg, tc);
		}

		let name = self.tables.qualify(&ctx.name, g);
		let mut rules = Vec::with_capacity(expanded.len());
		for e in &expanded {
			let default_attr = self.context_attr(e.grammar, e.context);
			let host = &raw[e.grammar].contexts[e.context].name;
			rules.push(self.rule(e.grammar, host, default_attr, e.rule)?);
		}

		let max_placeholder = rules.iter().map(rule_placeholder).max().unwrap_or(0);

		Ok(Context {
			name: name.into_boxed_str(),
			attribute,
			rules,
			line_end: self.switch(g, &ctx.name, &ctx.line_end)?,
			line_empty: ctx
				.line_empty
				.as_ref()
				.map(|s| self.switch(g, &ctx.name, s))
				.transpose()?,
			fallthrough: ctx
				.fallthrough
				.as_ref()
				.map(|s| self.switch(g, &ctx.name, s))
				.transpose()?,
			deliminators: g as u32,
			max_placeholder,
		})
	}

	/// Flattens `IncludeRules` of context `c` in grammar `g` into `out`.
	fn expand(
		&self,
		g: usize,
		c: usize,
		stack: &mut Vec<(usize, usize)>,
		out: &mut Vec<Expanded<'a>>,
		include_attrib: &mut Option<(usize, usize)>,
	) -> Result<(), LoadError> {
		let raw = self.raw;
		stack.push((g, c));
		let ctx = &raw[g].contexts[c];
		for rule in &ctx.rules {
			let RawRuleKind::IncludeRules { target, include_attrib: adopt } = &rule.kind else {
				out.push(Expanded {
					grammar: g,
					context: c,
					rule,
				});
				continue;
			};

			let (tg, local) = self.tables.target(g, target).ok_or_else(|| LoadError::UnresolvedContext {
				grammar: self.grammar_name(g),
				context: ctx.name.clone(),
				target: target.to_string(),
			})?;
			let tc = local as usize;
			if stack.contains(&(tg, tc)) {
				let mut path: Vec<String> = stack
					.iter()
					.map(|&(sg, sc)| self.tables.qualify(&raw[sg].contexts[sc].name, sg))
					.collect();
				path.push(self.tables.qualify(&raw[tg].contexts[tc].name, tg));
				return Err(LoadError::RuleIncludeCycle {
					grammar: self.grammar_name(g),
					path,
				});
			}
			if *adopt {
				*include_attrib = Some((tg, tc));
			}
			self.expand(tg, tc, stack, out, &mut None)?;
		}
		stack.pop();
		Ok(())
	}

	fn regex(&mut self, g: usize, context: &str, source: &str, insensitive: bool) -> Result<Arc<Regex>, LoadError> {
		let key = (source.to_string(), insensitive);
		if let Some(hit) = self.regexes.get(&key) {
			return Ok(hit.clone());
		}
		let regex = dynamic::compile_regex(source, insensitive).map_err(|e| LoadError::InvalidRegex {
			grammar: self.grammar_name(g),
			context: context.to_string(),
			pattern: source.to_string(),
			message: e.to_string(),
		})?;
		let regex = Arc::new(regex);
		self.regexes.insert(key, regex.clone());
		Ok(regex)
	}

	fn zero_width(&self, g: usize, context: &str, rule: &RawRule) -> LoadError {
		LoadError::ZeroWidthRule {
			grammar: self.grammar_name(g),
			context: context.to_string(),
			rule: rule.describe(),
		}
	}

	fn rule(&mut self, g: usize, context: &str, default_attr: AttributeId, raw: &RawRule) -> Result<Rule, LoadError> {
		let attribute = match &raw.attribute {
			Some(name) => self.attribute(g, context, name)?,
			None => default_attr,
		};
		let switch = self.switch(g, context, &raw.switch)?;
		let insensitive = raw.insensitive;
		let dynamic_in = |text: &str| raw.dynamic && dynamic::max_placeholder(text) > 0;

		let kind = match &raw.kind {
			RawRuleKind::DetectChar(text) => {
				let mut chars = text.chars();
				match (chars.next(), chars.next()) {
					(Some(d @ '1'..='9'), None) if raw.dynamic => RuleKind::DynamicChar {
						capture: d as usize - '0' as usize,
					},
					(Some(ch), None) => RuleKind::DetectChar { ch, insensitive },
					_ => {
						return Err(LoadError::InvalidAttribute {
							grammar: self.grammar_name(g),
							attribute: "char".to_string(),
							value: text.clone(),
						});
					}
				}
			}
			RawRuleKind::Detect2Chars(a, b) => RuleKind::Detect2Chars {
				chars: [*a, *b],
				insensitive,
			},
			RawRuleKind::AnyChar(set) => RuleKind::AnyChar {
				set: CharSet::new(set.chars()),
			},
			RawRuleKind::StringDetect(text) | RawRuleKind::WordDetect(text) => {
				if text.is_empty() && !raw.look_ahead {
					return Err(self.zero_width(g, context, raw));
				}
				let text = text.clone().into_boxed_str();
				if matches!(raw.kind, RawRuleKind::WordDetect(_)) {
					RuleKind::WordDetect { text, insensitive }
				} else {
					RuleKind::StringDetect { text, insensitive }
				}
			}
			RawRuleKind::Keyword(list) => {
				let id = self.tables.lists[g]
					.get(list)
					.copied()
					.ok_or_else(|| LoadError::UnresolvedKeywordList {
						grammar: self.grammar_name(g),
						context: context.to_string(),
						list: list.clone(),
					})?;
				RuleKind::Keyword { list: id }
			}
			RawRuleKind::RegExpr(source) if dynamic_in(source) => RuleKind::RegExpr(Pattern::Dynamic {
				source: source.clone().into_boxed_str(),
				insensitive,
			}),
			RawRuleKind::RegExpr(source) => {
				let regex = self.regex(g, context, source, insensitive)?;
				// An empty match that only highlights is harmless; one whose
				// whole effect is a context switch is not.
				let context_only = !switch.is_stay() || raw.attribute.is_none();
				if !raw.look_ahead && context_only && regex.is_match("").unwrap_or(false) {
					return Err(self.zero_width(g, context, raw));
				}
				RuleKind::RegExpr(Pattern::Static {
					source: source.clone().into_boxed_str(),
					regex,
				})
			}
			RawRuleKind::Int => RuleKind::Int,
			RawRuleKind::Float => RuleKind::Float,
			RawRuleKind::HlCOct => RuleKind::HlCOct,
			RawRuleKind::HlCHex => RuleKind::HlCHex,
			RawRuleKind::HlCStringChar => RuleKind::HlCStringChar,
			RawRuleKind::HlCChar => RuleKind::HlCChar,
			RawRuleKind::RangeDetect(begin, end) => {
				if begin.is_empty() && !raw.look_ahead {
					return Err(self.zero_width(g, context, raw));
				}
				let continuation = self.continuation(g, context, attribute, &switch, raw, end);
				RuleKind::RangeDetect {
					begin: begin.clone().into_boxed_str(),
					end: end.clone().into_boxed_str(),
					continuation,
					insensitive,
				}
			}
			RawRuleKind::LineContinue(ch) => RuleKind::LineContinue { ch: *ch },
			RawRuleKind::DetectSpaces => RuleKind::DetectSpaces,
			RawRuleKind::DetectIdentifier => RuleKind::DetectIdentifier,
			RawRuleKind::IncludeRules { .. } => {
				return Err(LoadError::UnknownRule {
					grammar: self.grammar_name(g),
					context: context.to_string(),
					element: "IncludeRules (as a child rule)".to_string(),
				});
			}
		};

		let mut children = Vec::with_capacity(raw.children.len());
		for child in &raw.children {
			let mut compiled = self.rule(g, context, attribute, child)?;
			// Children extend their parent's match; only the parent switches.
			compiled.switch = ContextSwitch::stay();
			children.push(compiled);
		}

		Ok(Rule {
			kind,
			attribute,
			switch,
			look_ahead: raw.look_ahead,
			first_non_space: raw.first_non_space,
			column: raw.column,
			dynamic: raw.dynamic,
			children,
		})
	}

	/// Synthesizes the context an unterminated `RangeDetect` continues in.
	///
	/// Its only rule is the end delimiter, which pops the continuation and then
	/// performs the range rule's own switch.
	fn continuation(
		&mut self,
		g: usize,
		context: &str,
		attribute: AttributeId,
		switch: &ContextSwitch,
		raw: &RawRule,
		end: &str,
	) -> ContextId {
		let id = ContextId(self.declared + self.extra.len() as u32);
		let name = format!("{}#range{}", self.tables.qualify(context, g), self.extra.len());
		let dynamic = raw.dynamic && dynamic::max_placeholder(end) > 0;

		let rules = if end.is_empty() {
			Vec::new()
		} else {
			vec![Rule {
				kind: RuleKind::StringDetect {
					text: end.into(),
					insensitive: raw.insensitive,
				},
				attribute,
				switch: switch.after_pops(1),
				look_ahead: false,
				first_non_space: false,
				column: None,
				dynamic,
				children: Vec::new(),
			}]
		};

		self.extra.push(Context {
			name: name.into_boxed_str(),
			attribute,
			rules,
			line_end: ContextSwitch::stay(),
			line_empty: None,
			fallthrough: None,
			deliminators: g as u32,
			max_placeholder: if dynamic { dynamic::max_placeholder(end) } else { 0 },
		});
		self.continuations.insert(id);
		id
	}
}

/// Highest placeholder a rule (or any of its children) binds at match time.
fn rule_placeholder(rule: &Rule) -> usize {
	let own = if !rule.dynamic {
		0
	} else {
		match &rule.kind {
			RuleKind::DynamicChar { capture } => *capture,
			RuleKind::StringDetect { text, .. } | RuleKind::WordDetect { text, .. } => dynamic::max_placeholder(text),
			RuleKind::RegExpr(pattern) => dynamic::max_placeholder(pattern.source()),
			RuleKind::RangeDetect { begin, end, .. } => dynamic::max_placeholder(begin).max(dynamic::max_placeholder(end)),
			_ => 0,
		}
	};
	rule.children.iter().map(rule_placeholder).fold(own, usize::max)
}

/// Number of capture groups a rule binds when it pushes a context.
fn bound_captures(rule: &Rule) -> usize {
	match &rule.kind {
		RuleKind::RegExpr(Pattern::Static { regex, .. }) => regex.captures_len().saturating_sub(1),
		RuleKind::RegExpr(Pattern::Dynamic { source, insensitive }) => {
			let stripped = dynamic::substitute::<&str>(source, &[], false);
			dynamic::compile_regex(&stripped, *insensitive)
				.map(|r| r.captures_len().saturating_sub(1))
				.unwrap_or(0)
		}
		_ => 0,
	}
}

/// Checks that every push of a dynamic context binds enough captures.
///
/// Continuation contexts inherit the frame of the range that opened them and
/// are exempt as push targets.
fn validate_dynamic_bindings(grammar: &Grammar, continuations: &FxHashSet<ContextId>) -> Result<(), LoadError> {
	let error = |target: ContextId, pusher: String, available: usize| LoadError::DynamicCapture {
		grammar: grammar.meta.name.clone(),
		context: grammar.context(target).name.to_string(),
		placeholder: grammar.context(target).max_placeholder,
		pusher,
		available,
	};
	let check = |switch: &ContextSwitch, available: usize, pusher: &dyn Fn() -> String| -> Result<(), LoadError> {
		for &target in &switch.push {
			if continuations.contains(&target) {
				continue;
			}
			if grammar.context(target).max_placeholder > available {
				return Err(error(target, pusher(), available));
			}
		}
		Ok(())
	};

	if grammar.context(grammar.default_context).max_placeholder > 0 {
		return Err(error(grammar.default_context, "the initial stack".to_string(), 0));
	}

	for (_, ctx) in grammar.contexts() {
		for rule in &ctx.rules {
			let pusher = || format!("{} in `{}`", rule.kind.element_name(), ctx.name);
			check(&rule.switch, bound_captures(rule), &pusher)?;
		}
		let end = || format!("lineEndContext of `{}`", ctx.name);
		check(&ctx.line_end, 0, &end)?;
		if let Some(switch) = &ctx.line_empty {
			let empty = || format!("lineEmptyContext of `{}`", ctx.name);
			check(switch, 0, &empty)?;
		}
		if let Some(switch) = &ctx.fallthrough {
			let fall = || format!("fallthroughContext of `{}`", ctx.name);
			check(switch, 0, &fall)?;
		}
	}
	Ok(())
}
