//! Geographic levels that location options are grouped by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Geographic level of a location option.
///
/// Serialized by the short code used in data files (`LA`, `REG`, ...), which
/// is also the key used for the level inside persisted mapping records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeographicLevel {
    #[serde(rename = "NAT")]
    Country,
    #[serde(rename = "EDA")]
    EnglishDevolvedArea,
    #[serde(rename = "INST")]
    Institution,
    #[serde(rename = "LA")]
    LocalAuthority,
    #[serde(rename = "LAD")]
    LocalAuthorityDistrict,
    #[serde(rename = "LEP")]
    LocalEnterprisePartnership,
    #[serde(rename = "LSIP")]
    LocalSkillsImprovementPlanArea,
    #[serde(rename = "MCA")]
    MayoralCombinedAuthority,
    #[serde(rename = "MAT")]
    MultiAcademyTrust,
    #[serde(rename = "OA")]
    OpportunityArea,
    #[serde(rename = "PCON")]
    ParliamentaryConstituency,
    #[serde(rename = "PA")]
    PlanningArea,
    #[serde(rename = "PROV")]
    Provider,
    #[serde(rename = "REG")]
    Region,
    #[serde(rename = "RSC")]
    RscRegion,
    #[serde(rename = "SCH")]
    School,
    #[serde(rename = "SPON")]
    Sponsor,
    #[serde(rename = "WARD")]
    Ward,
}

impl GeographicLevel {
    pub const ALL: [GeographicLevel; 18] = [
        Self::Country,
        Self::EnglishDevolvedArea,
        Self::Institution,
        Self::LocalAuthority,
        Self::LocalAuthorityDistrict,
        Self::LocalEnterprisePartnership,
        Self::LocalSkillsImprovementPlanArea,
        Self::MayoralCombinedAuthority,
        Self::MultiAcademyTrust,
        Self::OpportunityArea,
        Self::ParliamentaryConstituency,
        Self::PlanningArea,
        Self::Provider,
        Self::Region,
        Self::RscRegion,
        Self::School,
        Self::Sponsor,
        Self::Ward,
    ];

    /// Short code used in data files and persisted records.
    pub fn code(self) -> &'static str {
        match self {
            Self::Country => "NAT",
            Self::EnglishDevolvedArea => "EDA",
            Self::Institution => "INST",
            Self::LocalAuthority => "LA",
            Self::LocalAuthorityDistrict => "LAD",
            Self::LocalEnterprisePartnership => "LEP",
            Self::LocalSkillsImprovementPlanArea => "LSIP",
            Self::MayoralCombinedAuthority => "MCA",
            Self::MultiAcademyTrust => "MAT",
            Self::OpportunityArea => "OA",
            Self::ParliamentaryConstituency => "PCON",
            Self::PlanningArea => "PA",
            Self::Provider => "PROV",
            Self::Region => "REG",
            Self::RscRegion => "RSC",
            Self::School => "SCH",
            Self::Sponsor => "SPON",
            Self::Ward => "WARD",
        }
    }

    /// Singular human label, lower case (`"local authority"`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::EnglishDevolvedArea => "English devolved area",
            Self::Institution => "institution",
            Self::LocalAuthority => "local authority",
            Self::LocalAuthorityDistrict => "local authority district",
            Self::LocalEnterprisePartnership => "local enterprise partnership",
            Self::LocalSkillsImprovementPlanArea => "local skills improvement plan area",
            Self::MayoralCombinedAuthority => "mayoral combined authority",
            Self::MultiAcademyTrust => "multi-academy trust",
            Self::OpportunityArea => "opportunity area",
            Self::ParliamentaryConstituency => "parliamentary constituency",
            Self::PlanningArea => "planning area",
            Self::Provider => "provider",
            Self::Region => "region",
            Self::RscRegion => "RSC region",
            Self::School => "school",
            Self::Sponsor => "sponsor",
            Self::Ward => "ward",
        }
    }

    /// Plural human label, lower case (`"local authorities"`).
    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Country => "countries",
            Self::EnglishDevolvedArea => "English devolved areas",
            Self::Institution => "institutions",
            Self::LocalAuthority => "local authorities",
            Self::LocalAuthorityDistrict => "local authority districts",
            Self::LocalEnterprisePartnership => "local enterprise partnerships",
            Self::LocalSkillsImprovementPlanArea => "local skills improvement plan areas",
            Self::MayoralCombinedAuthority => "mayoral combined authorities",
            Self::MultiAcademyTrust => "multi-academy trusts",
            Self::OpportunityArea => "opportunity areas",
            Self::ParliamentaryConstituency => "parliamentary constituencies",
            Self::PlanningArea => "planning areas",
            Self::Provider => "providers",
            Self::Region => "regions",
            Self::RscRegion => "RSC regions",
            Self::School => "schools",
            Self::Sponsor => "sponsors",
            Self::Ward => "wards",
        }
    }
}

impl fmt::Display for GeographicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GeographicLevel {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownGeographicLevel(value.to_string()))
    }
}
