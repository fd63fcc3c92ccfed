use std::net::Ipv4Addr;

/// Extracts the first IPv4 address from `ip addr show` output.
///
/// Takes the token immediately after the first `inet` marker and parses it
/// as `address/prefix`, returning the address part. Primary and secondary
/// addresses are not distinguished; the first occurrence in document order
/// wins. A malformed first occurrence yields `None` outright rather than
/// scanning on for a later valid one.
pub fn first_ipv4_address(output: &str) -> Option<Ipv4Addr> {
    let mut tokens = output.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "inet" {
            let cidr = tokens.next()?;
            let (address, prefix) = cidr.split_once('/')?;
            let prefix: u8 = prefix.parse().ok()?;
            if prefix > 32 {
                return None;
            }
            return address.parse().ok();
        }
    }
    None
}
