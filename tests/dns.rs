use dnsclient::Error;
use dnsclient::Message;
use pretty_assertions::assert_eq;
use regex::Regex;

struct TestCase {
    // Name of the test case.
    name: &'static str,

    // Hex encoded binary string.
    binary: &'static str,

    // Dig-ish formatted output.
    string: &'static str,
}

const TESTS: &[TestCase] = &[
    TestCase {
        name: "example.com A",
        binary: concat!(
            "abcd81800001000100000000",
            "076578616d706c6503636f6d0000010001",
            "c00c000100010000012c00045db8d822",
        ),
        string: ";; ->>HEADER<<- opcode: Query, status: NoError, id: 43981
;; flags: qr rd ra; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 0

;; QUESTION SECTION:
;example.com. IN A

;; ANSWER SECTION:
example.com. 300 IN A 93.184.216.34",
    },
    TestCase {
        name: "google.com MX",
        binary: concat!(
            "12348180000100020000000006676f6f676c6503636f6d00000f0001",
            "c00c000f00010000012c0009000a04736d7470c00c",
            "c00c000f00010000012c0009001404616c7431c00c",
        ),
        string: ";; ->>HEADER<<- opcode: Query, status: NoError, id: 4660
;; flags: qr rd ra; QUERY: 1, ANSWER: 2, AUTHORITY: 0, ADDITIONAL: 0

;; QUESTION SECTION:
;google.com. IN MX

;; ANSWER SECTION:
google.com. 300 IN MX 10 smtp.google.com.
google.com. 300 IN MX 20 alt1.google.com.",
    },
    TestCase {
        name: "NXDOMAIN with SOA",
        binary: concat!(
            "000281830001000000010000046e6f7065076578616d706c6503636f6d0000010001",
            "c0110006000100000e10002c026e73056963616e6e036f726700036e6f6303646e73c031",
            "7886aa2700001c2000000e100012750000000e10",
        ),
        string: ";; ->>HEADER<<- opcode: Query, status: NXDomain, id: 2
;; flags: qr rd ra; QUERY: 1, ANSWER: 0, AUTHORITY: 1, ADDITIONAL: 0

;; QUESTION SECTION:
;nope.example.com. IN A

;; AUTHORITY SECTION:
example.com. 3600 IN SOA ns.icann.org. noc.dns.icann.org. 2022091303 7200 3600 1209600 3600",
    },
    TestCase {
        name: "CNAME, AAAA and an unknown type",
        binary: concat!(
            "00038180000100030000000003777777076578616d706c6503636f6d00001c0001",
            "c00c000500010000003c0002c010",
            "c010001c00010000003c001020010db8000000000000000000000001",
            "c010001000010000003c00060568656c6c6f",
        ),
        string: ";; ->>HEADER<<- opcode: Query, status: NoError, id: 3
;; flags: qr rd ra; QUERY: 1, ANSWER: 3, AUTHORITY: 0, ADDITIONAL: 0

;; QUESTION SECTION:
;www.example.com. IN AAAA

;; ANSWER SECTION:
www.example.com. 60 IN CNAME example.com.
example.com. 60 IN AAAA 2001:db8::1
example.com. 60 IN TYPE16 \\# 6 0568656c6c6f",
    },
];

fn normalise_whitespace(s: &str) -> String {
    let re = Regex::new(r"[ ]+").unwrap();
    re.replace_all(s, " ")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[test]
fn test_from_slice() {
    for case in TESTS {
        let input = hex::decode(case.binary)
            .unwrap_or_else(|e| panic!("{}: Invalid test case input: {}", case.name, e));
        let m = Message::from_slice(&input)
            .unwrap_or_else(|e| panic!("{}: Unable to parse: {}", case.name, e));

        // Normalise the formatted output a little (to allow little whitespace changes).
        let got = normalise_whitespace(&format!("{}", m));
        let want = normalise_whitespace(case.string);

        assert_eq!(got, want, "{}: Formatted string doesn't match", case.name);
    }
}

#[test]
fn test_to_vec() {
    for case in TESTS {
        let input = hex::decode(case.binary).unwrap();
        let m = Message::from_slice(&input).unwrap();

        // Names are written uncompressed, so compare the decoded messages.
        let output = m
            .to_vec()
            .unwrap_or_else(|e| panic!("{}: Unable to encode: {}", case.name, e));
        let got = Message::from_slice(&output)
            .unwrap_or_else(|e| panic!("{}: Unable to parse encoded message: {}", case.name, e));

        assert_eq!(got, m, "{}", case.name);
        assert!(output.len() >= input.len(), "{}: expanded pointers", case.name);
    }
}

#[test]
fn test_truncated() {
    for case in TESTS {
        let input = hex::decode(case.binary).unwrap();

        for len in 0..input.len() {
            match Message::from_slice(&input[..len]) {
                Err(Error::Malformed(_)) => (),
                other => panic!("{}: {} bytes: expected Malformed, got {:?}", case.name, len, other),
            }
        }
    }
}
