use crate::config::{AuthorityConfig, Period};

/// Every known ICON portal.
pub fn default_authorities() -> Vec<AuthorityConfig> {
    use Period::*;

    vec![
        AuthorityConfig::new("bayside", "https://eplanning.bayside.nsw.gov.au/ePlanning/Pages/XC.Track", ThisMonth)
            .types(&[217]),
        AuthorityConfig::new("blue_mountains", "https://www2.bmcc.nsw.gov.au/DATracking/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("boroondara", "https://eservices.boroondara.vic.gov.au/EPlanning/Pages/XC.Track", ThisMonth)
            .types(&["PlnPermit", "PlnAppeals", "PlnPostPer", "PlanPermGr", "PlanAmend", "PlanAppeal"]),
        AuthorityConfig::new("canada_bay", "https://canadabay-eplanning.t1cloud.com/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("central_highlands", "https://track.chrc.qld.gov.au/Pages/XC.Track", Last28Days)
            .types(&[205, 400, 401, 402, 403, 405]),
        AuthorityConfig::new("coffs_harbour", "https://chcc-icon.saas.t1cloud.com/public/Pages/xc.Track", Last14Days),
        AuthorityConfig::new("cumberland", "https://cumberland-eplanning.t1cloud.com/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("georges_river", "https://etrack.georgesriver.nsw.gov.au/Pages/XC.Track", ThisMonth),
        AuthorityConfig::new("gosnells", "http://apps.gosnells.wa.gov.au/ICON/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("greater_hume", "http://datracker.greaterhume.nsw.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("hobart", "https://apply.hobartcity.com.au/Pages/XC.Track", Last14Days)
            .types(&["PLN"]),
        AuthorityConfig::new("hornsby", "http://hscenquiry.hornsby.nsw.gov.au/Pages/XC.Track", Last14Days)
            .without_ssl_verify(),
        AuthorityConfig::new("kyogle", "https://etrack.kyogle.nsw.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("leichhardt", "http://www.eservices.lmc.nsw.gov.au/ApplicationTracking/Pages/XC.Track", Last14Days)
            .types(&[161]),
        AuthorityConfig::new("liverpool", "https://eplanning.liverpool.nsw.gov.au/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("mackay", "https://planning.mackay.qld.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("mosman", "http://portal.mosman.nsw.gov.au/Pages/XC.Track", Last14Days)
            .types(&[8, 5]),
        // XML output is broken here, so it goes through the listing page
        AuthorityConfig::new("northern_beaches", "https://eservices.northernbeaches.nsw.gov.au/ePlanning/live/Public/XC.Track", ThisMonth)
            .types(&["DevApp"])
            .html_listing(),
        AuthorityConfig::new("north_sydney", "https://apptracking.northsydney.nsw.gov.au/Pages/XC.Track", Last14Days),
        AuthorityConfig::new("penrith", "https://datracker.penrithcity.nsw.gov.au/track/Pages/XC.Track", Last28Days)
            .types(&["DA", "DevApp"]),
        AuthorityConfig::new("randwick", "https://planning.randwick.nsw.gov.au/pages/xc.track.advanced", Last14Days)
            .types(&[217]),
        AuthorityConfig::new("redland", "http://pdonline.redland.qld.gov.au/Pages/XC.Track", Last14Days)
            .types(&[
                "BD", "BW", "BA", "MC", "MCU", "OPW", "BWP", "APS",
                "MCSS", "OP", "EC", "SB", "SBSS", "PD", "BX", "ROL", "QRAL",
            ]),
        AuthorityConfig::new("richmond_valley", "http://datracker.richmondvalley.nsw.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("scenic_rim", "https://srr-prod-icon.saas.t1cloud.com/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("strathfield", "http://daenquiry.strathfield.nsw.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("swan", "https://elodge.swan.wa.gov.au/Pages/XC.Track", ThisWeek)
            .types(&[282, 281, 283]),
        AuthorityConfig::new("tweed", "https://s1.tweed.nsw.gov.au/Pages/XC.Track", ThisMonth)
            .types(&["DA", "CDC"]),
        AuthorityConfig::new("waverley", "https://eservices.waverley.nsw.gov.au/Pages/XC.Track", Last14Days)
            .types(&["A0", "SP2A", "TPO", "B1", "B1A", "FPS"]),
        AuthorityConfig::new("whitsunday", "http://eplanning.whitsundayrc.qld.gov.au/Pages/XC.Track", Last28Days),
        AuthorityConfig::new("willoughby", "https://eplanning.willoughby.nsw.gov.au/pages/xc.track", Last28Days)
            .types(&[
                "da01", "da01a", "da02a", "da03", "da05", "da06", "da07",
                "da10", "s96", "cc01a", "cc01b", "cc03", "cc04", "cd01a",
                "cd01b", "cd02", "cd04", "bcertu", "bcertr", "bcertc",
                "tvpa", "tvpa 2", "tvpa r",
            ]),
    ]
}
