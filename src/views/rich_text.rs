// ============================================================================
// Rendu du texte riche (description HTML des cryptos)
// ============================================================================
// Coinranking fournit la description en HTML venant de tiers. On
// l'interprète (paragraphes, titres, listes) sans jamais transmettre de
// balises au terminal :
// - <script> et <style> : contenu supprimé
// - balises de bloc : nouvelle ligne
// - toute autre balise : supprimée, le texte est gardé
// - entités (&amp;, &#39;, ...) : décodées
// - caractères de contrôle (ESC, BEL, ...) : supprimés, bruts ou décodés,
//   sinon ils seraient interprétés par le terminal
// ============================================================================

/// Rôle d'une ligne de texte riche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichStyle {
    Heading,
    Paragraph,
    ListItem,
}

/// Une ligne prête à afficher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichLine {
    pub style: RichStyle,
    pub text: String,
}

impl RichLine {
    pub fn new(style: RichStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Interprète un balisage en lignes de texte affichables
///
/// CONCEPT RUST : Trait comme point d'extension
/// - La vue détail reçoit un &dyn RichTextRenderer
/// - Un autre rendu (markdown, texte brut) peut être branché sans toucher
///   à la vue
pub trait RichTextRenderer {
    fn render(&self, markup: &str) -> Vec<RichLine>;
}

/// Rendu par défaut : interprète la structure, supprime tout le reste
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizingRenderer;

impl RichTextRenderer for SanitizingRenderer {
    fn render(&self, markup: &str) -> Vec<RichLine> {
        let mut builder = LineBuilder::default();
        let mut rest = markup;
        // Nom de la balise dont on ignore le contenu (script / style)
        let mut skip_until: Option<String> = None;

        while let Some(start) = rest.find('<') {
            let (text, after) = rest.split_at(start);
            if skip_until.is_none() {
                builder.push_text(text);
            }

            let Some(end) = tag_end(&after[1..]) else {
                // '<' sans '>' : texte littéral
                if skip_until.is_none() {
                    builder.push_text(after);
                }
                rest = "";
                break;
            };

            let tag = Tag::parse(&after[1..1 + end]);
            rest = &after[end + 2..];

            if let Some(name) = &skip_until {
                if tag.closing && &tag.name == name {
                    skip_until = None;
                }
                continue;
            }

            if !tag.closing && !tag.self_closing && matches!(tag.name.as_str(), "script" | "style") {
                skip_until = Some(tag.name);
                continue;
            }

            builder.apply(&tag);
        }

        if skip_until.is_none() {
            builder.push_text(rest);
        }

        builder.finish()
    }
}

// ============================================================================
// Parsing des balises
// ============================================================================

/// Position du '>' qui ferme la balise, hors des valeurs d'attribut entre
/// guillemets. Guillemet jamais refermé : premier '>' venu.
fn tag_end(raw: &str) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (index, c) in raw.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '>') => return Some(index),
            _ => {}
        }
    }

    raw.find('>')
}

struct Tag {
    name: String,
    closing: bool,
    /// "<br/>", "<script/>" : pas de contenu
    self_closing: bool,
}

impl Tag {
    /// Parse le contenu entre '<' et '>' (ex: "/p", "a href=...", "br/")
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let closing = raw.starts_with('/');
        let self_closing = raw.ends_with('/');
        let name = raw
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        Self {
            name,
            closing,
            self_closing,
        }
    }

    fn is_heading(&self) -> bool {
        matches!(self.name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }

    fn is_block(&self) -> bool {
        matches!(
            self.name.as_str(),
            "p" | "div" | "br" | "blockquote" | "ul" | "ol" | "tr" | "section" | "article" | "hr"
        )
    }
}

// ============================================================================
// Construction des lignes
// ============================================================================

struct LineBuilder {
    lines: Vec<RichLine>,
    current: String,
    style: RichStyle,
}

impl Default for LineBuilder {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            style: RichStyle::Paragraph,
        }
    }
}

impl LineBuilder {
    /// Ajoute du texte en normalisant les espaces (comme un navigateur)
    fn push_text(&mut self, text: &str) {
        for c in decode_entities(text).chars() {
            if c.is_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else if !c.is_control() {
                self.current.push(c);
            }
        }
    }

    fn apply(&mut self, tag: &Tag) {
        if tag.is_heading() {
            self.flush();
            self.style = if tag.closing {
                RichStyle::Paragraph
            } else {
                RichStyle::Heading
            };
        } else if tag.name == "li" {
            self.flush();
            self.style = if tag.closing {
                RichStyle::Paragraph
            } else {
                RichStyle::ListItem
            };
        } else if tag.is_block() {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let text = self.current.trim();
        if !text.is_empty() {
            self.lines.push(RichLine::new(self.style, text));
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<RichLine> {
        self.flush();
        self.lines
    }
}

/// Décode les entités HTML courantes et numériques
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        // Une entité fait au plus une dizaine de caractères : "&#x1F4B0;"
        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code).filter(|c| !c.is_control())
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
