//! Built-in ADGM regulatory reference passages.

use crate::store::Passage;

pub struct SeedItem {
    pub content: &'static str,
    pub source: &'static str,
    pub category: &'static str,
    pub citation: &'static str,
}

impl SeedItem {
    #[must_use]
    pub fn to_passage(&self, content: String) -> Passage {
        Passage {
            content,
            source: self.source.to_owned(),
            category: self.category.to_owned(),
            citation: self.citation.to_owned(),
        }
    }
}

/// The seed corpus served when no external knowledge source is configured.
#[must_use]
pub fn adgm_knowledge() -> Vec<SeedItem> {
    vec![
        SeedItem {
            content: "ADGM Registration & Incorporation Requirements: \
Companies incorporating in ADGM must submit specific documentation including: \
Articles of Association (AoA) compliant with ADGM template; \
Memorandum of Association stating company purpose and structure; \
Incorporation Application Form with all required particulars; \
Ultimate Beneficial Owner (UBO) Declaration with complete ownership details; \
Register of Members showing initial shareholding; \
Register of Directors with director particulars and appointments; \
Evidence of director appointments through Board or Shareholder Resolutions; \
Registered office address within ADGM jurisdiction; \
Statement of capital or guarantee as applicable. \
All documents must reference ADGM jurisdiction and comply with Companies Regulations 2020.",
            source: "ADGM Companies Regulations 2020",
            category: "incorporation",
            citation: "ADGM-REG-2020-S6",
        },
        SeedItem {
            content: "ADGM Jurisdiction Requirements: \
All corporate documents must specify ADGM Courts jurisdiction for dispute resolution. \
References to UAE Federal Courts, Dubai Courts, or other non-ADGM jurisdictions are non-compliant. \
Governing law clauses should reference ADGM laws where applicable. \
Correct jurisdiction clause example: \"This agreement shall be governed by ADGM laws and \
any disputes shall be subject to the exclusive jurisdiction of ADGM Courts.\" \
Registered office must be within ADGM boundaries. Addresses outside ADGM are invalid.",
            source: "ADGM Courts Framework",
            category: "jurisdiction",
            citation: "ADGM-COURTS-JURIS",
        },
        SeedItem {
            content: "Beneficial Ownership & Control Regulations: \
UBO declarations must include complete particulars: \
full legal name and any known aliases; date and place of birth; \
nationality and passport/ID details; residential address; \
nature and extent of beneficial ownership or control; \
date from which beneficial ownership/control commenced. \
Companies must maintain current UBO records and notify ADGM of changes within prescribed timeframes. \
Failure to maintain accurate UBO records constitutes regulatory breach.",
            source: "ADGM Beneficial Ownership Regulations 2022",
            category: "beneficial_ownership",
            citation: "ADGM-BOC-2022",
        },
        SeedItem {
            content: "Required Corporate Registers: \
ADGM companies must maintain the following registers: \
Register of Members with details of all shareholders, share holdings, and transfer dates; \
Register of Directors with full particulars of all directors, appointment dates, and resignations. \
Registers may be combined into a single \"Register of Members and Directors\" document. \
All register entries must be dated and signed by authorized persons. \
Registers must be available for inspection and filed with annual returns.",
            source: "ADGM Companies Regulations",
            category: "corporate_records",
            citation: "ADGM-REG-REGISTERS",
        },
        SeedItem {
            content: "Articles of Association Requirements: \
AoA must contain mandatory provisions covering: \
company name and registered office in ADGM; objects and purposes of the company; \
share capital structure or guarantee provisions; director appointment procedures and powers; \
shareholder rights and meeting procedures; share transfer restrictions and procedures; \
winding up provisions. \
Articles must be signed by all subscribers and witnessed. \
Non-standard provisions require ADGM Registration Authority approval.",
            source: "ADGM Model Articles",
            category: "articles",
            citation: "ADGM-MODEL-ARTICLES",
        },
        SeedItem {
            content: "Document Formatting and Execution Requirements: \
All corporate documents must include proper signatory blocks with name, title, and date; \
be executed by authorized persons with proper capacity; \
include witness signatures where required by law; \
use binding language (\"shall\", \"must\") rather than permissive (\"may\", \"should\"); \
reference correct legal names of parties; include proper document dating. \
Improper execution may invalidate legal effect of documents.",
            source: "ADGM Document Standards",
            category: "execution",
            citation: "ADGM-DOC-STANDARDS",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_has_six_items() {
        assert_eq!(adgm_knowledge().len(), 6);
    }

    #[test]
    fn citations_are_unique() {
        let items = adgm_knowledge();
        let mut citations: Vec<&str> = items.iter().map(|i| i.citation).collect();
        citations.sort_unstable();
        citations.dedup();
        assert_eq!(citations.len(), items.len());
    }

    #[test]
    fn to_passage_carries_metadata() {
        let items = adgm_knowledge();
        let passage = items[1].to_passage("chunk text".into());
        assert_eq!(passage.category, "jurisdiction");
        assert_eq!(passage.citation, "ADGM-COURTS-JURIS");
        assert_eq!(passage.content, "chunk text");
    }
}
