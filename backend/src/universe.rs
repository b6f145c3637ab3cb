//! Built-in NSE symbol universe.

use std::collections::HashSet;

use market::Symbol;

/// Tracked when no `--symbols` are configured. Contains a duplicate
/// (`HDFCBANK.NS`) which [`dedup_symbols`] removes.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "ACC.NS",
    "APLAPOLLO.NS", "AUBANK.NS", "AARTIIND.NS", "ABBOTINDIA.NS",
    "ADANIENSOL.NS", "ADANIENT.NS", "ADANIGREEN.NS", "ADANIPORTS.NS",
    "ATGL.NS", "ABCAPITAL.NS", "ABFRL.NS", "ALKEM.NS",
    "AMBUJACEM.NS", "ANGELONE.NS", "APOLLOHOSP.NS", "APOLLOTYRE.NS",
    "ASHOKLEY.NS", "ASIANPAINT.NS", "ASTRAL.NS", "ATUL.NS",
    "AUROPHARMA.NS", "DMART.NS", "AXISBANK.NS", "BSOFT.NS",
    "BSE.NS", "BAJAJ-AUTO.NS", "BAJFINANCE.NS", "BAJAJFINSV.NS",
    "BALKRISIND.NS", "BANDHANBNK.NS", "BANKBARODA.NS", "BANKINDIA.NS",
    "BATAINDIA.NS", "BERGEPAINT.NS", "BEL.NS", "BHARATFORG.NS",
    "BHEL.NS", "BPCL.NS", "BHARTIARTL.NS", "BIOCON.NS",
    "BOSCHLTD.NS", "BRITANNIA.NS", "CESC.NS", "CGPOWER.NS",
    "CANFINHOME.NS", "CANBK.NS", "CDSL.NS", "CHAMBLFERT.NS",
    "CHOLAFIN.NS", "CIPLA.NS", "CUB.NS", "COALINDIA.NS",
    "COFORGE.NS", "COLPAL.NS", "CAMS.NS", "CONCOR.NS",
    "COROMANDEL.NS", "CROMPTON.NS", "CUMMINSIND.NS", "CYIENT.NS",
    "DLF.NS", "DABUR.NS", "DALBHARAT.NS", "DEEPAKNTR.NS",
    "DELHIVERY.NS", "DIVISLAB.NS", "DIXON.NS", "LALPATHLAB.NS",
    "DRREDDY.NS", "EICHERMOT.NS", "ESCORTS.NS", "EXIDEIND.NS",
    "NYKAA.NS", "GAIL.NS", "GMRAIRPORT.NS", "GLENMARK.NS",
    "GODREJCP.NS", "GODREJPROP.NS", "GRANULES.NS", "GRASIM.NS",
    "GUJGASLTD.NS", "GNFC.NS", "HCLTECH.NS", "HDFCAMC.NS",
    "HDFCBANK.NS", "HDFCLIFE.NS", "HFCL.NS", "HAVELLS.NS",
    "HEROMOTOCO.NS", "HINDALCO.NS", "HAL.NS", "HINDCOPPER.NS",
    "HINDPETRO.NS", "HINDUNILVR.NS", "HUDCO.NS", "ICICIBANK.NS",
    "ICICIGI.NS", "ICICIPRULI.NS", "IDFCFIRSTB.NS", "IPCALAB.NS",
    "IRB.NS", "ITC.NS", "INDIAMART.NS", "INDIANB.NS",
    "IEX.NS", "IOC.NS", "IRCTC.NS", "JINDALSTEL.NS",
    "JSWSTEEL.NS", "JUBLFOOD.NS", "KOTAKBANK.NS", "L&T.NS",
    "LICHSGFIN.NS", "LTIMINDRA.NS", "M&M.NS", "MINDTREE.NS",
    "MOTHERSON.NS", "MPHASIS.NS", "MRF.NS", "MUTHOOTFIN.NS",
    "NATIONALUM.NS", "NESTLEIND.NS", "NMDC.NS", "NTPC.NS",
    "OIL.NS", "PAGEIND.NS", "PERSISTENT.NS", "PHILIPCARB.NS",
    "PIDILITIND.NS", "PNB.NS", "POLYCAB.NS", "POWERGRID.NS",
    "RECLTD.NS", "SBILIFE.NS", "SBIN.NS", "SHREECEM.NS",
    "SIEMENS.NS", "SRF.NS", "SUNPHARMA.NS", "TATAMOTORS.NS",
    "TATAPOWER.NS", "TATASTEEL.NS", "TECHM.NS", "TITAN.NS",
    "TORNTPOWER.NS", "ULTRACEMCO.NS", "UPL.NS", "WIPRO.NS",
    "ZOMATO.NS",
];

/// Trims, drops blanks and removes duplicates, keeping first-seen order.
pub fn dedup_symbols<I, S>(raw: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();

    raw.into_iter()
        .filter_map(|s| {
            let s = s.as_ref().trim();
            (!s.is_empty() && seen.insert(s.to_string())).then(|| Symbol::from(s))
        })
        .collect()
}

pub fn default_universe() -> Vec<Symbol> {
    dedup_symbols(DEFAULT_UNIVERSE.iter().copied())
}
