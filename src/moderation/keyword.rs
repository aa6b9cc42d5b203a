//! Trigger-phrase classifier.
//!
//! Each category owns a list of case-insensitive patterns compiled into a
//! `RegexSet` for the fast membership test, plus the individual regexes to
//! report which phrase fired.

use regex::{Regex, RegexSet};
use crate::errors::GatewayError;
use super::category::Category;
use super::classifier::ModerationClassifier;
use super::verdict::{ModerationVerdict, RuleHit};

/// How matches across categories are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Stop at the first category that matches (declaration order).
    FirstMatch,
    /// Scan every category and report all of them.
    AllMatches,
}

struct CategoryPatterns {
    category: Category,
    regex_set: RegexSet,
    regexes: Vec<Regex>,
    sources: Vec<String>,
}

impl CategoryPatterns {
    fn compile(category: Category, patterns: &[String]) -> Result<Self, GatewayError> {
        let sources: Vec<String> = patterns.iter().map(|p| p.trim().to_string()).collect();
        let anchored: Vec<String> = sources.iter().map(|p| format!("(?i){}", p)).collect();
        let regex_set = RegexSet::new(&anchored).map_err(|e| {
            GatewayError::Config(format!("Invalid trigger pattern for {}: {}", category, e))
        })?;
        let regexes = anchored
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GatewayError::Config(format!("Invalid trigger pattern for {}: {}", category, e)))?;
        Ok(Self { category, regex_set, regexes, sources })
    }

    fn first_hit(&self, text: &str) -> Option<RuleHit> {
        if !self.regex_set.is_match(text) {
            return None;
        }
        self.regexes.iter().zip(&self.sources).find_map(|(regex, source)| {
            regex.find(text).map(|m| RuleHit {
                category: self.category,
                pattern: source.clone(),
                matched: m.as_str().to_string(),
            })
        })
    }
}

/// Keyword classifier used for both moderation directions.
pub struct KeywordClassifier {
    name: String,
    mode: MatchMode,
    patterns: Vec<CategoryPatterns>,
}

impl KeywordClassifier {
    pub fn with_rules(
        name: &str,
        mode: MatchMode,
        rules: &[(Category, Vec<String>)],
    ) -> Result<Self, GatewayError> {
        let mut classifier = Self { name: name.to_string(), mode, patterns: Vec::new() };
        for (category, patterns) in rules {
            classifier.extend(*category, patterns)?;
        }
        Ok(classifier)
    }

    /// Prompt classifier: prompt injection, jailbreak, harmful content.
    /// One category per verdict.
    pub fn input() -> Result<Self, GatewayError> {
        Self::with_rules("keyword-input", MatchMode::FirstMatch, &default_input_rules())
    }

    /// Completion classifier: every response category is reported.
    pub fn response() -> Result<Self, GatewayError> {
        Self::with_rules("keyword-response", MatchMode::AllMatches, &default_response_rules())
    }

    /// Append trigger patterns to a category. Unknown categories are added
    /// after the existing ones.
    pub fn extend(&mut self, category: Category, patterns: &[String]) -> Result<(), GatewayError> {
        if patterns.is_empty() {
            return Ok(());
        }
        if category == Category::None {
            return Err(GatewayError::Config("Trigger patterns cannot target category 'none'".into()));
        }

        match self.patterns.iter().position(|p| p.category == category) {
            Some(idx) => {
                let mut merged = self.patterns[idx].sources.clone();
                merged.extend(patterns.iter().cloned());
                self.patterns[idx] = CategoryPatterns::compile(category, &merged)?;
            }
            None => self.patterns.push(CategoryPatterns::compile(category, patterns)?),
        }
        Ok(())
    }
}

impl ModerationClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_classify(&self, text: &str) -> Result<ModerationVerdict, GatewayError> {
        // Whole text, whatever its length; RegexSet matching is linear.
        let text_lower = text.to_lowercase();
        let mut hits = Vec::new();
        for cat_patterns in &self.patterns {
            if let Some(hit) = cat_patterns.first_hit(&text_lower) {
                hits.push(hit);
                if self.mode == MatchMode::FirstMatch {
                    break;
                }
            }
        }

        Ok(ModerationVerdict::flagged(&self.name, hits))
    }
}

fn rules(category: Category, patterns: &[&str]) -> (Category, Vec<String>) {
    (category, patterns.iter().map(|p| p.to_string()).collect())
}

fn default_input_rules() -> Vec<(Category, Vec<String>)> {
    vec![
        rules(Category::PromptInjection, &[
            r"\bignore\s+(all\s+)?(the\s+)?(previous|prior|above|earlier)\s+(instructions|prompts|rules)",
            r"\bdisregard\s+(all\s+)?(the\s+)?(previous|prior|above|your)\s+(instructions|prompts|rules)",
            r"\bforget\s+(all\s+)?(your|the|previous)\s+(instructions|rules|training)",
            r"\b(reveal|show|print|repeat|tell\s+me)\s+(me\s+)?(your|the)\s+(system\s+prompt|hidden\s+instructions|initial\s+instructions)",
            r"\bnew\s+instructions\s*:",
            r"\boverride\s+(your|the)\s+(instructions|guidelines|rules)",
        ]),
        rules(Category::Jailbreak, &[
            r"\bdo\s+anything\s+now\b",
            r"\byou\s+are\s+(now\s+)?dan\b",
            r"\bdeveloper\s+mode\b",
            r"\bjailbreak",
            r"\bpretend\s+(that\s+)?you\s+(are|have)\s+no\s+(rules|restrictions|guidelines)",
            r"\b(without|with\s+no)\s+(any\s+)?(restrictions|filters|limitations)\b",
            r"\bbypass\s+(your\s+)?(safety|content)\s+(filters|guidelines|policies)",
        ]),
        rules(Category::HarmfulContent, &[
            r"\bhow\s+(do\s+i|to|can\s+i)\s+(make|build|create)\s+(a\s+)?(bomb|explosive|bioweapon|chemical\s+weapon)",
            r"\bhow\s+(do\s+i|to|can\s+i)\s+(kill|poison|hurt)\s+(someone|a\s+person|people|my)",
            r"\b(synthesize|cook|manufacture)\s+(meth|methamphetamine|fentanyl|sarin)",
            r"\bchild\s+(porn|sexual\s+abuse\s+material)",
        ]),
    ]
}

fn default_response_rules() -> Vec<(Category, Vec<String>)> {
    vec![
        rules(Category::HarmfulInstructions, &[
            r"\bhere\s+is\s+how\s+to\s+(hack|break\s+into|exploit|bypass)",
            r"\bhow\s+to\s+hack\s+into\b",
            r"\bstep[- ]by[- ]step\s+(guide|instructions)\s+(to|for)\s+(hacking|making\s+a\s+bomb|building\s+a\s+weapon)",
            r"\b(write|create|deploy)\s+(a\s+)?(malware|ransomware|keylogger)",
            r"\bsteps\s+to\s+(build|make)\s+(a\s+)?(bomb|explosive|weapon)",
        ]),
        rules(Category::IllegalActivities, &[
            r"\b(launder|laundering)\s+(money|funds|the\s+proceeds)",
            r"\bmoney\s+laundering\b",
            r"\b(buy|sell|purchase)\s+(illegal\s+)?(drugs|cocaine|heroin|firearms)\s+(online|on\s+the\s+dark\s+web)",
            r"\bcounterfeit\s+(money|currency|bills)",
            r"\bevade\s+(taxes|the\s+police|law\s+enforcement)",
            r"\bsteal\s+(credit\s+cards?|someone's\s+identity|identities)",
        ]),
        rules(Category::Violence, &[
            r"\b(kill|murder|assassinate|stab|shoot)\s+(him|her|them|someone|people)\b",
            r"\b(mass\s+shooting|terrorist\s+attack)\b",
            r"\btorture\s+(him|her|them|someone|people)\b",
            r"\bbeat\s+(him|her|them|someone)\s+up\b",
        ]),
        rules(Category::SelfHarm, &[
            r"\b(kill|hurt|harm)\s+yourself\b",
            r"\b(suicide|suicidal)\s+(methods?|ways)\b",
            r"\bend\s+your\s+(own\s+)?life\b",
            r"\bself[- ]harm\s+(methods|techniques|tips)\b",
        ]),
    ]
}
